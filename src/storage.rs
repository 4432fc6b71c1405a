//! File persistence collaborator.
//!
//! The transfer engine only decides *that* a payload is complete; writing
//! it somewhere durable is this module's job, behind the [`FileStore`]
//! trait so tests can observe persistence without touching disk.

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

/// Durable storage for received file payloads.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Write a received payload, returning where it ended up.
    async fn persist(&self, filename: &str, data: Bytes) -> io::Result<PathBuf>;
}

/// Writes received files under a directory, as `received_<basename>`.
pub struct DiskStore {
    dir: PathBuf,
}

impl DiskStore {
    /// Create the store, creating the directory if needed.
    pub fn new<P: AsRef<Path>>(dir: P) -> io::Result<Self> {
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir: dir.as_ref().to_path_buf(),
        })
    }

    /// Reduce a client-supplied filename to a safe basename.
    ///
    /// Clients declare arbitrary filenames on the wire; only the final
    /// path component is honored.
    fn sanitize(filename: &str) -> String {
        Path::new(filename)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .filter(|n| n != "." && n != "..")
            .unwrap_or_else(|| "unnamed".to_string())
    }
}

#[async_trait]
impl FileStore for DiskStore {
    async fn persist(&self, filename: &str, data: Bytes) -> io::Result<PathBuf> {
        let path = self
            .dir
            .join(format!("received_{}", Self::sanitize(filename)));
        tokio::fs::write(&path, &data).await?;
        info!(path = %path.display(), bytes = data.len(), "File saved to disk");
        Ok(path)
    }
}

/// In-memory store, used by tests to assert on persistence calls.
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: DashMap<String, Bytes>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a persisted payload by its declared filename.
    pub fn get(&self, filename: &str) -> Option<Bytes> {
        self.files.get(filename).map(|e| e.value().clone())
    }

    /// Number of persisted files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether nothing has been persisted.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[async_trait]
impl FileStore for MemoryStore {
    async fn persist(&self, filename: &str, data: Bytes) -> io::Result<PathBuf> {
        self.files.insert(filename.to_string(), data);
        Ok(PathBuf::from(filename))
    }
}
