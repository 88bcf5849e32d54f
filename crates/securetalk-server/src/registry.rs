// ============================================
// File: crates/securetalk-server/src/registry.rs
// ============================================
//! # Connection Registry
//!
//! ## Creation Reason
//! The relay's only shared state is the set of live connections it fans
//! frames out to. The registry keeps that state as a concurrent map of
//! per-peer write queues, so registration, removal, and broadcast can race
//! freely across connection tasks.
//!
//! ## Main Functionality
//! - `ConnectionRegistry`: register / remove / broadcast over a `DashMap`
//! - `PeerHandle`: address plus the sending end of a peer's write queue
//! - Idempotent removal; removing an absent peer is a no-op
//!
//! ## Ownership Discipline
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │ Registry entry      ──►  mpsc queue  ──►  writer task         │
//! │ (PeerHandle, tx)          (FIFO)          (owns write half)   │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//! Nothing outside a peer's writer task ever touches its socket. Removal
//! drops the queue's sender; the writer drains what was already enqueued
//! and exits. A handle that has been removed can therefore never be
//! written to again, and per-peer FIFO queues preserve the order in which
//! one sender's frames were broadcast.
//!
//! ## ⚠️ Important Note for Next Developer
//! - Never remove entries while holding a `DashMap` iterator; collect the
//!   dead peers first, then remove (shard locks are re-entrant hostile)
//! - Broadcast enqueues; it must never block on a slow peer's socket
//!
//! ## Last Modified
//! v0.1.0 - Initial registry implementation

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{debug, trace};

// ============================================
// Types
// ============================================

/// Identifier assigned to each registered connection.
pub type PeerId = u64;

/// Bookkeeping entry for one live connection.
#[derive(Debug)]
pub struct PeerHandle {
    /// Remote address, for logging.
    pub addr: SocketAddr,
    /// Sending end of the peer's write queue.
    tx: mpsc::UnboundedSender<Bytes>,
}

// ============================================
// ConnectionRegistry
// ============================================

/// Live-connection bookkeeping used for broadcast fan-out.
///
/// # Concurrency
/// Safe under concurrent registration from newly accepted connections,
/// concurrent removal (a peer's own close racing a broadcast-discovered
/// failure), and iteration during mutation. `DashMap` shards the locking;
/// removal of an already-absent peer is a no-op.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    peers: DashMap<PeerId, PeerHandle>,
    next_id: AtomicU64,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection and returns its assigned id.
    ///
    /// # Arguments
    /// * `addr` - Remote address of the connection
    /// * `tx` - Sending end of the connection's write queue
    pub fn register(&self, addr: SocketAddr, tx: mpsc::UnboundedSender<Bytes>) -> PeerId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.peers.insert(id, PeerHandle { addr, tx });
        debug!(peer = id, %addr, "Peer registered");
        id
    }

    /// Removes a connection.
    ///
    /// Idempotent: removing a peer that is already gone returns `false`
    /// and changes nothing. Dropping the entry closes the write queue,
    /// which lets the peer's writer task drain and exit.
    pub fn remove(&self, id: PeerId) -> bool {
        match self.peers.remove(&id) {
            Some((_, handle)) => {
                debug!(peer = id, addr = %handle.addr, "Peer removed");
                true
            }
            None => false,
        }
    }

    /// Returns `true` if the peer is currently registered.
    #[must_use]
    pub fn contains(&self, id: PeerId) -> bool {
        self.peers.contains_key(&id)
    }

    /// Returns the number of registered connections.
    #[must_use]
    pub fn count(&self) -> usize {
        self.peers.len()
    }

    /// Enqueues a frame to every registered peer except the sender.
    ///
    /// A peer whose queue is closed (its writer task already failed and
    /// deregistered, or is mid-teardown) is evicted here; that never
    /// aborts delivery to the remaining peers and is never reported to
    /// the sender.
    ///
    /// # Returns
    /// The number of peers the frame was enqueued to.
    pub fn broadcast(&self, sender: PeerId, frame: &Bytes) -> usize {
        let mut delivered = 0;
        let mut dead = Vec::new();

        for entry in self.peers.iter() {
            let id = *entry.key();
            if id == sender {
                continue;
            }
            if entry.value().tx.send(frame.clone()).is_ok() {
                delivered += 1;
            } else {
                dead.push(id);
            }
        }

        // Evict outside the iteration to avoid holding shard locks.
        for id in dead {
            if self.remove(id) {
                debug!(peer = id, "Evicted peer with closed write queue");
            }
        }

        trace!(
            sender,
            delivered,
            len = frame.len(),
            "Broadcast fan-out complete"
        );
        delivered
    }
}

// ============================================
// Tests
// ============================================
