//! Per-connection session state.

use bytes::BytesMut;
use chrono::{DateTime, Utc};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

/// Internal identifier for a live connection.
///
/// Allocated at accept time; usernames come later (a connection is
/// anonymous until its first line) and may change, so routing inside the
/// daemon is by `ConnId` and only the registry maps names to ids.
pub type ConnId = u64;

/// Allocates connection ids, monotonically increasing from 1.
#[derive(Debug, Default)]
pub struct ConnIdGenerator {
    counter: AtomicU64,
}

impl ConnIdGenerator {
    /// Create a new generator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next connection id.
    pub fn next(&self) -> ConnId {
        self.counter.fetch_add(1, Ordering::Relaxed) + 1
    }
}

/// File-transfer status of one session.
///
/// The uploader (the connection that issued `/sendfile`) is `Sending` and
/// carries the accumulator; its raw bytes are diverted away from line
/// parsing until `buffered` reaches `size`. The recipient is `Receiving`,
/// which records the pending transfer so a second one can be refused and
/// teardown can clear it.
#[derive(Debug, Default)]
pub enum TransferState {
    /// No transfer in flight.
    #[default]
    Idle,
    /// This connection is uploading a file.
    Sending {
        /// Recipient username at the time the transfer started.
        to: String,
        /// Declared filename.
        filename: String,
        /// Declared payload size in bytes.
        size: u64,
        /// Bytes accumulated so far, in arrival order.
        buffered: BytesMut,
    },
    /// A peer is uploading a file addressed to this connection.
    Receiving {
        /// Sender username.
        from: String,
        /// Declared filename.
        filename: String,
        /// Declared payload size in bytes.
        size: u64,
    },
}

impl TransferState {
    /// Whether no transfer is in flight.
    pub fn is_idle(&self) -> bool {
        matches!(self, TransferState::Idle)
    }

    /// Take the current state, leaving `Idle` behind.
    pub fn take(&mut self) -> TransferState {
        std::mem::take(self)
    }
}

/// Mutable per-connection state: identity plus transfer status.
///
/// One `Session` per live connection, created at accept with no name;
/// the first received line supplies the username and creates the registry
/// entry.
#[derive(Debug)]
pub struct Session {
    /// The owning connection.
    pub id: ConnId,
    /// Remote peer address.
    pub addr: SocketAddr,
    /// Registered username, `None` until the first line is accepted.
    pub name: Option<String>,
    /// File-transfer status.
    pub transfer: TransferState,
    /// When the connection was accepted.
    pub connected_at: DateTime<Utc>,
}

impl Session {
    /// Create a fresh, unregistered session.
    pub fn new(id: ConnId, addr: SocketAddr) -> Self {
        Self {
            id,
            addr,
            name: None,
            transfer: TransferState::Idle,
            connected_at: Utc::now(),
        }
    }

    /// Whether the connection has registered a username.
    pub fn is_registered(&self) -> bool {
        self.name.is_some()
    }

    /// Name for log lines; unregistered connections show as `*`.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("*")
    }
}
