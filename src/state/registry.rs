//! The username registry.
//!
//! Bidirectional association between usernames and live connections.
//! Both maps live behind one lock so every operation is atomic with
//! respect to every other: two connections can never both succeed at
//! registering the same name, and a rename either fully succeeds or
//! leaves no trace.

use crate::state::ConnId;
use parking_lot::RwLock;
use std::collections::HashMap;
use thiserror::Error;

/// Registry operation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("name already taken: {0}")]
    NameTaken(String),
}

#[derive(Debug, Default)]
struct Inner {
    by_name: HashMap<String, ConnId>,
    by_conn: HashMap<ConnId, String>,
}

/// Authoritative mapping of usernames to live connections.
#[derive(Debug, Default)]
pub struct Registry {
    inner: RwLock<Inner>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `conn`. Fails if the name is already present.
    pub fn register(&self, name: &str, conn: ConnId) -> Result<(), RegistryError> {
        let mut inner = self.inner.write();
        if inner.by_name.contains_key(name) {
            return Err(RegistryError::NameTaken(name.to_string()));
        }
        inner.by_name.insert(name.to_string(), conn);
        inner.by_conn.insert(conn, name.to_string());
        Ok(())
    }

    /// Atomically rebind `conn` from its current name to `new`.
    ///
    /// Fails without side effects if `new` is taken; on success routing by
    /// the old name fails immediately.
    pub fn rename(&self, new: &str, conn: ConnId) -> Result<(), RegistryError> {
        let mut inner = self.inner.write();
        if let Some(holder) = inner.by_name.get(new) {
            // Renaming to one's own current name is a no-op, not a conflict.
            if *holder == conn {
                return Ok(());
            }
            return Err(RegistryError::NameTaken(new.to_string()));
        }
        let Some(old) = inner.by_conn.get(&conn).cloned() else {
            // Unregistered connections have nothing to rename; treat as a
            // fresh registration.
            inner.by_name.insert(new.to_string(), conn);
            inner.by_conn.insert(conn, new.to_string());
            return Ok(());
        };
        inner.by_name.remove(&old);
        inner.by_name.insert(new.to_string(), conn);
        inner.by_conn.insert(conn, new.to_string());
        Ok(())
    }

    /// Look up the connection holding `name`.
    pub fn lookup(&self, name: &str) -> Option<ConnId> {
        self.inner.read().by_name.get(name).copied()
    }

    /// Look up the name held by `conn`.
    pub fn name_of(&self, conn: ConnId) -> Option<String> {
        self.inner.read().by_conn.get(&conn).cloned()
    }

    /// Remove `conn`'s entry, returning the name it held. Idempotent.
    pub fn remove(&self, conn: ConnId) -> Option<String> {
        let mut inner = self.inner.write();
        let name = inner.by_conn.remove(&conn)?;
        inner.by_name.remove(&name);
        Some(name)
    }

    /// Snapshot of all registered names.
    pub fn names(&self) -> Vec<String> {
        self.inner.read().by_name.keys().cloned().collect()
    }

    /// Snapshot of all `(name, conn)` pairs, for broadcast fan-out.
    pub fn entries(&self) -> Vec<(String, ConnId)> {
        self.inner
            .read()
            .by_name
            .iter()
            .map(|(name, conn)| (name.clone(), *conn))
            .collect()
    }

    /// Number of registered names.
    pub fn len(&self) -> usize {
        self.inner.read().by_name.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.read().by_name.is_empty()
    }
}
