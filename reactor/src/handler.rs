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

//! Worker callback traits

use crate::reactor::WorkerHandle;
use crate::worker::Worker;
use std::net::SocketAddr;

/// Callbacks invoked by the reactor loop on worker lifecycle events.
///
/// All callbacks run on the reactor task with exclusive access to the
/// worker's buffers. They must not block; anything long-running belongs
/// on another task talking back through a [`WorkerHandle`].
pub trait WorkerHandler: Send + 'static {
    /// The connection is established (or the stream was adopted).
    ///
    /// For a persistent worker this fires again after every reconnect.
    fn on_connect(&mut self, worker: &mut Worker) {
        let _ = worker;
    }

    /// New inbound bytes were appended to the worker's read buffer.
    ///
    /// The handler may consume as much or as little as it wants;
    /// unconsumed bytes stay buffered for the next call.
    fn on_receive(&mut self, worker: &mut Worker) {
        let _ = worker;
    }

    /// The connection closed. The read buffer still holds any unconsumed
    /// bytes.
    ///
    /// For a worker with a reconnect policy, returning `false` vetoes the
    /// reconnect and the worker is torn down instead. The return value is
    /// ignored for non-persistent workers.
    fn on_close(&mut self, worker: &mut Worker) -> bool {
        let _ = worker;
        true
    }
}

/// Builds a handler for each child worker accepted by a listener.
pub trait ChildFactory: Send + 'static {
    /// Called on the reactor task for every accepted connection.
    fn build(&mut self, peer: SocketAddr, handle: WorkerHandle) -> Box<dyn WorkerHandler>;
}

impl<F> ChildFactory for F
where
    F: FnMut(SocketAddr, WorkerHandle) -> Box<dyn WorkerHandler> + Send + 'static,
{
    fn build(&mut self, peer: SocketAddr, handle: WorkerHandle) -> Box<dyn WorkerHandler> {
        self(peer, handle)
    }
}
