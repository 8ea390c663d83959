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

//! Buffered worker state handed to handler callbacks

use crate::types::WorkerId;
use bytes::{Buf, Bytes, BytesMut};
use std::net::SocketAddr;
use tracing::trace;

/// A buffered socket endpoint.
///
/// All reads and writes go through the worker's buffers; the reactor loop
/// moves bytes between the buffers and the socket when it is ready. Handler
/// callbacks receive `&mut Worker` and never touch the socket directly.
pub struct Worker {
    id: WorkerId,
    inbound: BytesMut,
    outbound: BytesMut,
    peer: Option<SocketAddr>,
    open: bool,
    close_requested: bool,
}

impl Worker {
    pub(crate) fn new(id: WorkerId) -> Self {
        Self {
            id,
            inbound: BytesMut::new(),
            outbound: BytesMut::new(),
            peer: None,
            open: false,
            close_requested: false,
        }
    }

    /// This worker's identifier
    pub fn id(&self) -> WorkerId {
        self.id
    }

    /// Peer address, if connected
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer
    }

    /// Whether the underlying connection is currently open
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Number of buffered inbound bytes not yet consumed
    pub fn available(&self) -> usize {
        self.inbound.len()
    }

    /// Queue bytes for transmission. Buffered data survives until the
    /// socket accepts it; nothing is dropped on a short write. Once a
    /// close has been requested further sends are discarded.
    pub fn send(&mut self, data: &[u8]) {
        if self.close_requested {
            trace!(worker = %self.id, bytes = data.len(), "send after close dropped");
            return;
        }
        self.outbound.extend_from_slice(data);
    }

    /// Consume and return up to `max` buffered inbound bytes
    pub fn read(&mut self, max: usize) -> Bytes {
        let n = max.min(self.inbound.len());
        self.inbound.split_to(n).freeze()
    }

    /// Consume and return the entire inbound buffer
    pub fn read_all(&mut self) -> Bytes {
        self.inbound.split().freeze()
    }

    /// Look at up to `max` buffered inbound bytes without consuming them
    pub fn peek(&self, max: usize) -> &[u8] {
        &self.inbound[..max.min(self.inbound.len())]
    }

    /// Discard up to `n` buffered inbound bytes
    pub fn consume(&mut self, n: usize) {
        let n = n.min(self.inbound.len());
        self.inbound.advance(n);
    }

    /// Request that the connection be closed once pending output drains.
    ///
    /// For a persistent worker this triggers the normal close path, so the
    /// reconnect policy (and `on_close` veto) still applies.
    pub fn close(&mut self) {
        self.close_requested = true;
    }

    // --- reactor-internal plumbing -------------------------------------

    pub(crate) fn push_inbound(&mut self, data: &[u8]) {
        self.inbound.extend_from_slice(data);
    }

    pub(crate) fn has_outbound(&self) -> bool {
        !self.outbound.is_empty()
    }

    pub(crate) fn outbound_bytes(&self) -> &[u8] {
        &self.outbound
    }

    pub(crate) fn advance_outbound(&mut self, n: usize) {
        self.outbound.advance(n);
    }

    pub(crate) fn close_requested(&self) -> bool {
        self.close_requested
    }

    pub(crate) fn set_peer(&mut self, peer: Option<SocketAddr>) {
        self.peer = peer;
    }

    pub(crate) fn mark_open(&mut self) {
        self.open = true;
        self.close_requested = false;
    }

    pub(crate) fn mark_closed(&mut self) {
        self.open = false;
        self.peer = None;
    }

    /// Drop both buffers ahead of a reconnect attempt so stale output is
    /// never replayed at the new connection.
    pub(crate) fn reset_for_reconnect(&mut self) {
        self.inbound.clear();
        self.outbound.clear();
        self.close_requested = false;
    }
}
