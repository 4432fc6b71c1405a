//! chatterd entry point: config, logging, storage, and the gateway.

use chatterd::config::Config;
use chatterd::network::Gateway;
use chatterd::state::Hub;
use chatterd::storage::DiskStore;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Load configuration; a missing file runs on defaults.
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "chatterd.toml".to_string());

    let config = Config::load_or_default(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    info!(
        server = %config.server.name,
        listen = %config.server.listen,
        "Starting chatterd"
    );

    let store = Arc::new(DiskStore::new(&config.storage.dir).map_err(|e| {
        error!(dir = %config.storage.dir.display(), error = %e, "Failed to prepare storage directory");
        e
    })?);
    info!(dir = %config.storage.dir.display(), "File storage ready");

    let hub = Arc::new(Hub::new(&config, store));

    let gateway = Gateway::bind(config.server.listen, hub).await?;
    gateway.run().await
}
