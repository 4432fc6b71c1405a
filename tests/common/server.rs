//! Test server management.
//!
//! Runs a chatterd instance inside the test process on an ephemeral
//! port, with an in-memory file store so transfer persistence can be
//! asserted directly.

use chatterd::config::Config;
use chatterd::network::Gateway;
use chatterd::state::Hub;
use chatterd::storage::MemoryStore;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// A test server instance.
pub struct TestServer {
    addr: SocketAddr,
    /// The server's file store, for persistence assertions.
    pub store: Arc<MemoryStore>,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Spawn a new test server on an ephemeral port.
    pub async fn spawn() -> anyhow::Result<Self> {
        let mut config = Config::default();
        config.server.listen = "127.0.0.1:0".parse()?;

        let store = Arc::new(MemoryStore::new());
        let hub = Arc::new(Hub::new(&config, store.clone()));
        let gateway = Gateway::bind(config.server.listen, hub).await?;
        let addr = gateway.local_addr()?;

        let handle = tokio::spawn(async move {
            if let Err(e) = gateway.run().await {
                eprintln!("test server exited: {e}");
            }
        });

        Ok(Self {
            addr,
            store,
            handle,
        })
    }

    /// Get the server address.
    pub fn address(&self) -> String {
        self.addr.to_string()
    }

    /// Connect a client and register it under `name`.
    pub async fn connect(&self, name: &str) -> anyhow::Result<super::client::TestClient> {
        let mut client = self.connect_anonymous().await?;
        client.register(name).await?;
        Ok(client)
    }

    /// Connect a client without registering a username.
    pub async fn connect_anonymous(&self) -> anyhow::Result<super::client::TestClient> {
        super::client::TestClient::connect(&self.address()).await
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
