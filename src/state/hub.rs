//! The Hub - central shared state for the chat daemon.
//!
//! The Hub holds the username registry, all sessions, and the outbound
//! queue handles for message routing. It is created once in `main` and
//! injected into the gateway and every connection task as an `Arc`; there
//! is no ambient global state.

use crate::config::{Config, LimitsConfig};
use crate::network::Outbound;
use crate::state::{ConnId, ConnIdGenerator, Registry, Session};
use crate::storage::FileStore;
use chatter_proto::colors;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::debug;

/// This server's identity information.
#[derive(Debug, Clone)]
pub struct ServerInfo {
    /// Name used in notices and logs.
    pub name: String,
    /// Startup time (Unix timestamp).
    pub created: i64,
}

/// Central shared state container.
pub struct Hub {
    /// Authoritative username <-> connection mapping.
    pub registry: Registry,

    /// All live sessions, indexed by connection id.
    pub sessions: DashMap<ConnId, Arc<RwLock<Session>>>,

    /// Connection id to outbound queue mapping for routing.
    senders: DashMap<ConnId, mpsc::Sender<Outbound>>,

    /// This server's identity.
    pub server_info: ServerInfo,

    /// Protocol limits from configuration.
    pub limits: LimitsConfig,

    /// Persistence collaborator for received files.
    pub store: Arc<dyn FileStore>,

    /// Connection id generator.
    pub conn_ids: ConnIdGenerator,
}

impl Hub {
    /// Create the hub from configuration and a storage collaborator.
    pub fn new(config: &Config, store: Arc<dyn FileStore>) -> Self {
        Self {
            registry: Registry::new(),
            sessions: DashMap::new(),
            senders: DashMap::new(),
            server_info: ServerInfo {
                name: config.server.name.clone(),
                created: chrono::Utc::now().timestamp(),
            },
            limits: config.limits.clone(),
            store,
            conn_ids: ConnIdGenerator::new(),
        }
    }

    /// Register a connection's outbound queue for routing.
    pub fn register_sender(&self, conn: ConnId, tx: mpsc::Sender<Outbound>) {
        self.senders.insert(conn, tx);
    }

    /// Drop a connection's outbound queue. Idempotent.
    pub fn remove_sender(&self, conn: ConnId) {
        self.senders.remove(&conn);
    }

    /// Get a session by connection id.
    pub fn session(&self, conn: ConnId) -> Option<Arc<RwLock<Session>>> {
        self.sessions.get(&conn).map(|s| Arc::clone(s.value()))
    }

    /// Queue an item for one connection's writer.
    ///
    /// Best effort: a torn-down or backed-up peer is the peer's problem,
    /// never the caller's. Returns whether the item was queued.
    pub async fn send_to(&self, conn: ConnId, item: Outbound) -> bool {
        // Clone the handle out of the map before awaiting.
        let Some(tx) = self.senders.get(&conn).map(|e| e.value().clone()) else {
            return false;
        };
        let queued = tx.send(item).await.is_ok();
        if !queued {
            debug!(conn, "Dropped message for closed connection");
        }
        queued
    }

    /// Send a system notice line to one connection.
    pub async fn notice(&self, conn: ConnId, text: String) -> bool {
        self.send_to(conn, Outbound::Line(text)).await
    }

    /// Broadcast a chat message from a registered user.
    ///
    /// Delivered as `"<sender>: <text>"` to every registered connection
    /// except the sender, each at most once.
    pub async fn broadcast_from(&self, from: ConnId, from_name: &str, text: &str) {
        let line = format!("{from_name}: {text}");
        for (_, conn) in self.registry.entries() {
            if conn != from {
                self.send_to(conn, Outbound::Line(line.clone())).await;
            }
        }
    }

    /// Broadcast a system notice to every registered connection except one.
    ///
    /// Used for join/part/rename notices, where the excluded connection
    /// already received its own confirmation.
    pub async fn broadcast_notice_except(&self, except: ConnId, text: &str) {
        let line = colors::paint(colors::YELLOW, text);
        for (_, conn) in self.registry.entries() {
            if conn != except {
                self.send_to(conn, Outbound::Line(line.clone())).await;
            }
        }
    }
}
