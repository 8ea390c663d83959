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

//! Commands delivered to the reactor loop from other tasks and threads

use crate::handler::{ChildFactory, WorkerHandler};
use crate::reconnect::ReconnectPolicy;
use crate::types::WorkerId;
use bytes::Bytes;
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};

/// A command sent over the reactor's channel.
///
/// Commands queued before the loop blocks are always drained before any
/// socket event of the same iteration is serviced.
pub(crate) enum Command {
    /// Register a new worker or listener
    Register(Registration),
    /// Enqueue outbound bytes on a worker
    Send(WorkerId, Bytes),
    /// Close a worker; persistent workers will reconnect unless vetoed
    Close(WorkerId),
    /// Tear a worker down for good, reconnect policy notwithstanding
    Abandon(WorkerId),
    /// Shut the reactor down, closing every worker and listener
    Stop,
}

/// A registration request, carrying the id assigned at submission time so
/// the caller's handle is valid before the loop ever sees the worker.
pub(crate) struct Registration {
    pub(crate) id: WorkerId,
    pub(crate) kind: RegistrationKind,
}

pub(crate) enum RegistrationKind {
    /// Open an outbound connection
    Connect {
        addr: SocketAddr,
        policy: ReconnectPolicy,
        handler: Box<dyn WorkerHandler>,
    },
    /// Adopt an already-connected stream
    Adopt {
        stream: TcpStream,
        handler: Box<dyn WorkerHandler>,
    },
    /// Adopt a bound std listener; the loop registers it with the runtime
    Listen {
        listener: std::net::TcpListener,
        factory: Box<dyn ChildFactory>,
    },
    /// Adopt an already-registered tokio listener
    ListenOn {
        listener: TcpListener,
        factory: Box<dyn ChildFactory>,
    },
}
