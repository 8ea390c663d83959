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

//! Cooperative socket reactor with buffered workers.
//!
//! A single [`Reactor`] task multiplexes every registered TCP socket.
//! Handlers implement [`WorkerHandler`] and exchange bytes through the
//! [`Worker`] buffers; they run on the reactor task and never touch a
//! socket directly. Listeners spawn a child worker per accepted
//! connection, and outbound workers can carry a [`ReconnectPolicy`] that
//! re-dials the peer after a fixed or exponentially backed-off delay.
//!
//! ```no_run
//! use ioflux_reactor::{Reactor, ReactorConfig, Worker, WorkerHandler};
//!
//! struct Echo;
//!
//! impl WorkerHandler for Echo {
//!     fn on_receive(&mut self, worker: &mut Worker) {
//!         let data = worker.read_all();
//!         worker.send(&data);
//!     }
//! }
//!
//! # #[tokio::main] async fn main() -> ioflux_reactor::Result<()> {
//! let (reactor, handle) = Reactor::new(ReactorConfig::default());
//! handle.listen("127.0.0.1:4000".parse().unwrap(), |_peer, _handle| {
//!     Box::new(Echo) as Box<dyn WorkerHandler>
//! })?;
//! reactor.run().await;
//! # Ok(())
//! # }
//! ```

mod command;
mod config;
mod error;
mod handler;
mod reactor;
mod reconnect;
mod types;
mod worker;

pub use crate::config::ReactorConfig;
pub use crate::error::{ReactorError, Result};
pub use crate::handler::{ChildFactory, WorkerHandler};
pub use crate::reactor::{Reactor, ReactorHandle, WorkerHandle};
pub use crate::reconnect::ReconnectPolicy;
pub use crate::types::{CloseReason, WorkerId};
pub use crate::worker::Worker;
