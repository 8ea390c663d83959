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

//! Error types for the telnet engine

use thiserror::Error;

/// Result type for telnet operations
pub type Result<T> = std::result::Result<T, TelnetError>;

/// Protocol violations that kill a connection's decoder.
///
/// These are never propagated as panics or connection resets; the decoder
/// records the first one and goes permanently quiet, which is how
/// conservative telnet implementations treat a corrupt peer.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum TelnetError {
    /// A byte after IAC that names no known command
    #[error("unknown command byte {0} after IAC")]
    UnknownCommand(u8),
}
