//! Configuration loading and defaults.
//!
//! Every field defaults, so the daemon runs without a config file; a
//! partial file only needs the sections it changes.

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Daemon configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server identity and listen address.
    #[serde(default)]
    pub server: ServerConfig,
    /// Received-file storage.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Protocol limits.
    #[serde(default)]
    pub limits: LimitsConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults if the file is absent.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

/// Server identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server name used in notices and logs.
    #[serde(default = "default_server_name")]
    pub name: String,
    /// Address to listen on.
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: default_server_name(),
            listen: default_listen(),
        }
    }
}

fn default_server_name() -> String {
    "chatterd.local".to_string()
}

fn default_listen() -> SocketAddr {
    "127.0.0.1:5050".parse().expect("static listen address")
}

/// Where received files are persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory for received files (created on startup).
    #[serde(default = "default_storage_dir")]
    pub dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
        }
    }
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from("received")
}

/// Protocol limits.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Maximum command line length in bytes, terminator included.
    #[serde(default = "default_max_line_len")]
    pub max_line_len: usize,
    /// Maximum declared `/sendfile` size in bytes.
    #[serde(default = "default_max_transfer_size")]
    pub max_transfer_size: u64,
    /// Per-connection outbound queue depth.
    #[serde(default = "default_outbound_queue")]
    pub outbound_queue: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_line_len: default_max_line_len(),
            max_transfer_size: default_max_transfer_size(),
            outbound_queue: default_outbound_queue(),
        }
    }
}

fn default_max_line_len() -> usize {
    512
}

fn default_max_transfer_size() -> u64 {
    16 * 1024 * 1024
}

fn default_outbound_queue() -> usize {
    64
}
