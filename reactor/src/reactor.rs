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

//! The reactor event loop and its handles

use crate::command::{Command, Registration, RegistrationKind};
use crate::config::ReactorConfig;
use crate::error::{ReactorError, Result};
use crate::handler::{ChildFactory, WorkerHandler};
use crate::reconnect::ReconnectPolicy;
use crate::types::{CloseReason, WorkerId};
use crate::worker::Worker;
use bytes::Bytes;
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::HashMap;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::io::{Interest, Ready};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tokio_util::time::DelayQueue;
use tokio_util::time::delay_queue::Key;
use tracing::{debug, trace, warn};

type ConnectFuture =
    Pin<Box<dyn Future<Output = (WorkerId, io::Result<TcpStream>)> + Send + 'static>>;
type IoFuture<'a> = Pin<Box<dyn Future<Output = IoEvent> + Send + 'a>>;

/// Where a worker's connection currently stands
enum Endpoint {
    /// A live socket the loop multiplexes over
    Connected(TcpStream),
    /// An outbound connect attempt is in flight
    Connecting,
    /// A reconnect timer is pending in the delay queue
    Waiting(Key),
}

struct WorkerEntry {
    worker: Worker,
    endpoint: Endpoint,
    handler: Box<dyn WorkerHandler>,
    /// Remote address to dial, present only for outbound workers
    addr: Option<SocketAddr>,
    policy: ReconnectPolicy,
    /// Delay used for the most recent reconnect, the backoff input
    delay: Option<Duration>,
}

struct ListenerEntry {
    listener: TcpListener,
    factory: Box<dyn ChildFactory>,
}

/// What woke the loop up this iteration
enum Wake {
    Command(Option<Command>),
    Connected(WorkerId, io::Result<TcpStream>),
    Reconnect(WorkerId),
    Io(IoEvent),
    Tick,
}

enum IoEvent {
    Ready(WorkerId, io::Result<Ready>),
    Accepted(WorkerId, io::Result<(TcpStream, SocketAddr)>),
}

/// Cloneable handle for registering work with a running [`Reactor`].
///
/// All methods are synchronous and safe to call from any thread; they queue
/// a command that the loop services before its next multiplex wait.
#[derive(Clone)]
pub struct ReactorHandle {
    tx: mpsc::UnboundedSender<Command>,
    next_id: Arc<AtomicU64>,
}

impl ReactorHandle {
    fn allocate(&self) -> WorkerId {
        WorkerId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    fn submit(&self, command: Command) -> Result<()> {
        self.tx.send(command).map_err(|_| ReactorError::Stopped)
    }

    /// Open an outbound connection that closes for good when it drops.
    pub fn connect<H>(&self, addr: SocketAddr, handler: H) -> Result<WorkerHandle>
    where
        H: WorkerHandler,
    {
        self.connect_persistent(addr, ReconnectPolicy::Never, handler)
    }

    /// Open an outbound connection governed by a reconnect policy.
    pub fn connect_persistent<H>(
        &self,
        addr: SocketAddr,
        policy: ReconnectPolicy,
        handler: H,
    ) -> Result<WorkerHandle>
    where
        H: WorkerHandler,
    {
        let id = self.allocate();
        self.submit(Command::Register(Registration {
            id,
            kind: RegistrationKind::Connect {
                addr,
                policy,
                handler: Box::new(handler),
            },
        }))?;
        Ok(WorkerHandle {
            id,
            tx: self.tx.clone(),
        })
    }

    /// Hand an already-connected stream to the reactor.
    pub fn adopt<H>(&self, stream: TcpStream, handler: H) -> Result<WorkerHandle>
    where
        H: WorkerHandler,
    {
        let id = self.allocate();
        self.submit(Command::Register(Registration {
            id,
            kind: RegistrationKind::Adopt {
                stream,
                handler: Box::new(handler),
            },
        }))?;
        Ok(WorkerHandle {
            id,
            tx: self.tx.clone(),
        })
    }

    /// Bind a listening socket. Each accepted connection becomes a child
    /// worker with a handler built by `factory`.
    ///
    /// Returns the listener's id and the bound local address, which matters
    /// when binding port 0.
    pub fn listen<F>(&self, addr: SocketAddr, factory: F) -> Result<(WorkerId, SocketAddr)>
    where
        F: ChildFactory,
    {
        let listener = std::net::TcpListener::bind(addr)?;
        listener.set_nonblocking(true)?;
        let local = listener.local_addr()?;
        let id = self.allocate();
        self.submit(Command::Register(Registration {
            id,
            kind: RegistrationKind::Listen {
                listener,
                factory: Box::new(factory),
            },
        }))?;
        Ok((id, local))
    }

    /// Hand an already-bound tokio listener to the reactor.
    pub fn listen_on<F>(&self, listener: TcpListener, factory: F) -> Result<WorkerId>
    where
        F: ChildFactory,
    {
        let id = self.allocate();
        self.submit(Command::Register(Registration {
            id,
            kind: RegistrationKind::ListenOn {
                listener,
                factory: Box::new(factory),
            },
        }))?;
        Ok(id)
    }

    /// Close a worker or listener from outside the loop. Persistent workers
    /// go through their normal reconnect path; closing a listener stops
    /// accepting without touching already-accepted children.
    pub fn close(&self, id: WorkerId) -> Result<()> {
        self.submit(Command::Close(id))
    }

    /// Shut the reactor down. Every worker and listener is torn down and
    /// [`Reactor::run`] returns.
    pub fn stop(&self) -> Result<()> {
        self.submit(Command::Stop)
    }
}

/// Cloneable handle to a single worker, usable from any thread.
#[derive(Clone)]
pub struct WorkerHandle {
    id: WorkerId,
    tx: mpsc::UnboundedSender<Command>,
}

impl WorkerHandle {
    /// The worker this handle refers to
    pub fn id(&self) -> WorkerId {
        self.id
    }

    /// Queue bytes for transmission on the worker
    pub fn send(&self, data: impl Into<Bytes>) -> Result<()> {
        self.tx
            .send(Command::Send(self.id, data.into()))
            .map_err(|_| ReactorError::Stopped)
    }

    /// Close the worker once its pending output drains. A persistent
    /// worker reconnects unless its handler vetoes.
    pub fn close(&self) -> Result<()> {
        self.tx
            .send(Command::Close(self.id))
            .map_err(|_| ReactorError::Stopped)
    }

    /// Tear the worker down immediately, overriding any reconnect policy.
    pub fn abandon(&self) -> Result<()> {
        self.tx
            .send(Command::Abandon(self.id))
            .map_err(|_| ReactorError::Stopped)
    }
}

/// Single-task event loop multiplexing every registered socket.
///
/// One `Reactor` owns all worker state; handlers run inside the loop and
/// need no synchronization. Cross-thread interaction goes through
/// [`ReactorHandle`] and [`WorkerHandle`].
pub struct Reactor {
    config: ReactorConfig,
    rx: mpsc::UnboundedReceiver<Command>,
    // kept so child worker handles can be minted on accept
    tx: mpsc::UnboundedSender<Command>,
    next_id: Arc<AtomicU64>,
    workers: HashMap<WorkerId, WorkerEntry>,
    listeners: HashMap<WorkerId, ListenerEntry>,
    connecting: FuturesUnordered<ConnectFuture>,
    reconnects: DelayQueue<WorkerId>,
    scratch: Vec<u8>,
    running: bool,
}

impl Reactor {
    /// Build a reactor and the handle used to feed it.
    pub fn new(config: ReactorConfig) -> (Self, ReactorHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let next_id = Arc::new(AtomicU64::new(1));
        let handle = ReactorHandle {
            tx: tx.clone(),
            next_id: Arc::clone(&next_id),
        };
        let scratch = vec![0u8; config.read_chunk_size];
        let reactor = Self {
            config,
            rx,
            tx,
            next_id,
            workers: HashMap::new(),
            listeners: HashMap::new(),
            connecting: FuturesUnordered::new(),
            reconnects: DelayQueue::new(),
            scratch,
            running: true,
        };
        (reactor, handle)
    }

    /// Run the loop until [`ReactorHandle::stop`] is called.
    ///
    /// Each iteration drains every queued command before servicing socket
    /// events, then blocks on at most one multiplex wait bounded by
    /// `poll_interval`.
    pub async fn run(mut self) {
        debug!("reactor started");
        while self.running {
            self.drain_commands();
            if !self.running {
                break;
            }
            match self.wait().await {
                Wake::Command(Some(command)) => self.handle_command(command),
                Wake::Command(None) => self.running = false,
                Wake::Connected(id, result) => self.finish_connect(id, result),
                Wake::Reconnect(id) => self.start_reconnect(id),
                Wake::Io(IoEvent::Ready(id, result)) => self.service_worker(id, result),
                Wake::Io(IoEvent::Accepted(id, result)) => self.service_accept(id, result),
                Wake::Tick => trace!("idle tick"),
            }
        }
        self.shutdown();
        debug!("reactor stopped");
    }

    fn drain_commands(&mut self) {
        loop {
            match self.rx.try_recv() {
                Ok(command) => self.handle_command(command),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.running = false;
                    break;
                }
            }
        }
    }

    /// Block until something needs servicing. Commands win ties so queued
    /// work is never starved by busy sockets.
    async fn wait(&mut self) -> Wake {
        let mut io: FuturesUnordered<IoFuture<'_>> = FuturesUnordered::new();
        for (&id, entry) in &self.workers {
            if let Endpoint::Connected(stream) = &entry.endpoint {
                let interest = if entry.worker.has_outbound() {
                    Interest::READABLE | Interest::WRITABLE
                } else {
                    Interest::READABLE
                };
                io.push(Box::pin(async move {
                    IoEvent::Ready(id, stream.ready(interest).await)
                }));
            }
        }
        for (&id, entry) in &self.listeners {
            let listener = &entry.listener;
            io.push(Box::pin(async move {
                IoEvent::Accepted(id, listener.accept().await)
            }));
        }
        tokio::select! {
            biased;
            command = self.rx.recv() => Wake::Command(command),
            Some((id, result)) = self.connecting.next() => Wake::Connected(id, result),
            Some(expired) = self.reconnects.next() => Wake::Reconnect(expired.into_inner()),
            Some(event) = io.next() => Wake::Io(event),
            _ = tokio::time::sleep(self.config.poll_interval) => Wake::Tick,
        }
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Register(registration) => self.register(registration),
            Command::Send(id, data) => {
                match self.workers.get_mut(&id) {
                    Some(entry) => entry.worker.send(&data),
                    None => debug!(worker = %id, "send to unknown worker dropped"),
                }
                self.flush(id);
                self.settle(id);
            }
            Command::Close(id) => {
                if let Some(entry) = self.workers.get_mut(&id) {
                    entry.worker.close();
                    self.flush(id);
                    self.settle(id);
                } else if self.listeners.remove(&id).is_some() {
                    // children keep running; only the accept loop stops
                    debug!(listener = %id, "listener closed");
                }
            }
            Command::Abandon(id) => {
                if self.listeners.remove(&id).is_some() {
                    debug!(listener = %id, "listener closed");
                } else {
                    self.teardown(id, CloseReason::Abandoned);
                }
            }
            Command::Stop => self.running = false,
        }
    }

    fn register(&mut self, registration: Registration) {
        let id = registration.id;
        match registration.kind {
            RegistrationKind::Connect {
                addr,
                policy,
                handler,
            } => {
                debug!(worker = %id, %addr, "connecting");
                self.workers.insert(
                    id,
                    WorkerEntry {
                        worker: Worker::new(id),
                        endpoint: Endpoint::Connecting,
                        handler,
                        addr: Some(addr),
                        policy,
                        delay: None,
                    },
                );
                self.start_connect(id, addr);
            }
            RegistrationKind::Adopt { stream, handler } => {
                debug!(worker = %id, "adopted stream");
                let peer = stream.peer_addr().ok();
                let mut entry = WorkerEntry {
                    worker: Worker::new(id),
                    endpoint: Endpoint::Connected(stream),
                    handler,
                    addr: None,
                    policy: ReconnectPolicy::Never,
                    delay: None,
                };
                entry.worker.set_peer(peer);
                entry.worker.mark_open();
                entry.handler.on_connect(&mut entry.worker);
                self.workers.insert(id, entry);
                self.flush(id);
                self.settle(id);
            }
            RegistrationKind::Listen { listener, factory } => {
                match TcpListener::from_std(listener) {
                    Ok(listener) => {
                        debug!(listener = %id, addr = ?listener.local_addr().ok(), "listening");
                        self.listeners.insert(id, ListenerEntry { listener, factory });
                    }
                    Err(error) => warn!(listener = %id, %error, "failed to register listener"),
                }
            }
            RegistrationKind::ListenOn { listener, factory } => {
                debug!(listener = %id, addr = ?listener.local_addr().ok(), "listening");
                self.listeners.insert(id, ListenerEntry { listener, factory });
            }
        }
    }

    fn start_connect(&mut self, id: WorkerId, addr: SocketAddr) {
        let timeout = self.config.connect_timeout;
        self.connecting.push(Box::pin(async move {
            let result = match tokio::time::timeout(timeout, TcpStream::connect(addr)).await {
                Ok(result) => result,
                Err(_) => Err(io::Error::new(io::ErrorKind::TimedOut, "connect timed out")),
            };
            (id, result)
        }));
    }

    fn finish_connect(&mut self, id: WorkerId, result: io::Result<TcpStream>) {
        let Some(entry) = self.workers.get_mut(&id) else {
            // worker was closed while the attempt was in flight
            return;
        };
        if !matches!(entry.endpoint, Endpoint::Connecting) {
            return;
        }
        match result {
            Ok(stream) => {
                let peer = stream.peer_addr().ok();
                entry.endpoint = Endpoint::Connected(stream);
                entry.delay = None;
                entry.worker.set_peer(peer);
                entry.worker.mark_open();
                debug!(worker = %id, peer = ?peer, "connected");
                entry.handler.on_connect(&mut entry.worker);
                self.flush(id);
                self.settle(id);
            }
            Err(error) => {
                if entry.policy.reconnects() {
                    debug!(worker = %id, %error, "connect failed, will retry");
                    self.schedule_reconnect(id);
                } else {
                    debug!(worker = %id, %error, "connect failed");
                    self.teardown(id, CloseReason::Error);
                }
            }
        }
    }

    fn schedule_reconnect(&mut self, id: WorkerId) {
        let Some(entry) = self.workers.get_mut(&id) else {
            return;
        };
        let Some(delay) = entry.policy.next_delay(entry.delay) else {
            self.teardown(id, CloseReason::Error);
            return;
        };
        entry.delay = Some(delay);
        let key = self.reconnects.insert(id, delay);
        entry.endpoint = Endpoint::Waiting(key);
        debug!(worker = %id, ?delay, "reconnect scheduled");
    }

    fn start_reconnect(&mut self, id: WorkerId) {
        let Some(entry) = self.workers.get_mut(&id) else {
            return;
        };
        let Some(addr) = entry.addr else {
            // adopted streams have nowhere to dial back to
            self.teardown(id, CloseReason::Error);
            return;
        };
        entry.endpoint = Endpoint::Connecting;
        self.start_connect(id, addr);
    }

    /// Move bytes for one readable/writable worker, then run callbacks.
    fn service_worker(&mut self, id: WorkerId, result: io::Result<Ready>) {
        let ready = match result {
            Ok(ready) => ready,
            Err(error) => {
                warn!(worker = %id, %error, "socket poll failed");
                self.teardown(id, CloseReason::Error);
                return;
            }
        };
        if ready.is_readable() {
            let scratch = &mut self.scratch;
            let Some(entry) = self.workers.get_mut(&id) else {
                return;
            };
            let WorkerEntry {
                worker,
                endpoint,
                handler,
                ..
            } = entry;
            let Endpoint::Connected(stream) = endpoint else {
                return;
            };
            match stream.try_read(scratch) {
                Ok(0) => {
                    debug!(worker = %id, "peer closed connection");
                    self.teardown(id, CloseReason::PeerClosed);
                    return;
                }
                Ok(n) => {
                    trace!(worker = %id, bytes = n, "received");
                    worker.push_inbound(&scratch[..n]);
                    handler.on_receive(worker);
                }
                Err(ref error) if error.kind() == io::ErrorKind::WouldBlock => {}
                Err(error) => {
                    warn!(worker = %id, %error, "read failed");
                    self.teardown(id, CloseReason::Error);
                    return;
                }
            }
        }
        if ready.is_writable() {
            if !self.flush(id) {
                return;
            }
        }
        self.settle(id);
    }

    /// Push pending output at the socket. Returns false when the worker was
    /// torn down by a write error.
    fn flush(&mut self, id: WorkerId) -> bool {
        loop {
            let Some(entry) = self.workers.get_mut(&id) else {
                return false;
            };
            let WorkerEntry {
                worker, endpoint, ..
            } = entry;
            let Endpoint::Connected(stream) = endpoint else {
                return true;
            };
            if !worker.has_outbound() {
                return true;
            }
            match stream.try_write(worker.outbound_bytes()) {
                Ok(n) => {
                    trace!(worker = %id, bytes = n, "sent");
                    worker.advance_outbound(n);
                }
                Err(ref error) if error.kind() == io::ErrorKind::WouldBlock => return true,
                Err(error) => {
                    warn!(worker = %id, %error, "write failed");
                    self.teardown(id, CloseReason::Error);
                    return false;
                }
            }
        }
    }

    /// Tear the worker down if a requested close has finished draining.
    fn settle(&mut self, id: WorkerId) {
        let Some(entry) = self.workers.get(&id) else {
            return;
        };
        if entry.worker.close_requested() && !entry.worker.has_outbound() {
            self.teardown(id, CloseReason::Requested);
        }
    }

    fn service_accept(&mut self, id: WorkerId, result: io::Result<(TcpStream, SocketAddr)>) {
        let (stream, peer) = match result {
            Ok(accepted) => accepted,
            Err(error) => {
                // transient accept errors leave the listener in place
                warn!(listener = %id, %error, "accept failed");
                return;
            }
        };
        let child = WorkerId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let handle = WorkerHandle {
            id: child,
            tx: self.tx.clone(),
        };
        let handler = match self.listeners.get_mut(&id) {
            Some(entry) => entry.factory.build(peer, handle),
            None => return,
        };
        debug!(listener = %id, worker = %child, %peer, "accepted connection");
        let mut entry = WorkerEntry {
            worker: Worker::new(child),
            endpoint: Endpoint::Connected(stream),
            handler,
            addr: None,
            policy: ReconnectPolicy::Never,
            delay: None,
        };
        entry.worker.set_peer(Some(peer));
        entry.worker.mark_open();
        entry.handler.on_connect(&mut entry.worker);
        self.workers.insert(child, entry);
        self.flush(child);
        self.settle(child);
    }

    /// Remove a worker, firing `on_close` once per connection cycle and
    /// rescheduling persistent workers unless vetoed or abandoned.
    fn teardown(&mut self, id: WorkerId, reason: CloseReason) {
        let Some(mut entry) = self.workers.remove(&id) else {
            return;
        };
        if let Endpoint::Waiting(key) = &entry.endpoint {
            // on_close already ran when this connection cycle ended
            self.reconnects.try_remove(key);
            debug!(worker = %id, %reason, "reconnect cancelled");
            return;
        }
        entry.worker.mark_closed();
        let resume = entry.handler.on_close(&mut entry.worker);
        let reconnect = reason != CloseReason::Abandoned
            && resume
            && entry.policy.reconnects()
            && entry.addr.is_some();
        if reconnect {
            debug!(worker = %id, %reason, "connection lost, rescheduling");
            entry.worker.reset_for_reconnect();
            entry.endpoint = Endpoint::Connecting;
            self.workers.insert(id, entry);
            self.schedule_reconnect(id);
        } else {
            debug!(worker = %id, %reason, "worker closed");
        }
    }

    fn shutdown(&mut self) {
        self.listeners.clear();
        let ids: Vec<WorkerId> = self.workers.keys().copied().collect();
        for id in ids {
            self.teardown(id, CloseReason::Abandoned);
        }
        self.reconnects.clear();
    }
}
