//
// Copyright 2024-2026 The ioflux Authors. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Telnet option negotiation and line-mode sessions.
//!
//! The negotiation engine implements the Q method of
//! [RFC1143](https://tools.ietf.org/html/rfc1143): per-option,
//! per-side state with a single queued opposite request, which bounds the
//! number of commands either side can emit and rules out negotiation
//! loops. [`TelnetMachine`] wraps the engine in a byte-stream decoder that
//! handles `IAC` escaping and subnegotiation framing; [`TelnetSession`]
//! runs a complete interactive session over an
//! [`ioflux_reactor`] worker, decoding keystrokes into edited lines.

mod error;
mod frame;
mod machine;
mod option;
mod qstate;
mod session;

pub mod consts;

pub use crate::error::{Result, TelnetError};
pub use crate::frame::TelnetFrame;
pub use crate::machine::{TelnetEvent, TelnetMachine};
pub use crate::option::TelnetOption;
pub use crate::qstate::{
    NegotiationPolicy, OptionNegotiator, Pending, QState, Reaction, Sign, Step, TelnetSide,
    step_receive, step_request,
};
pub use crate::session::{SessionHandler, SessionOutput, TelnetSession};
