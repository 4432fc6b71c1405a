//! Gateway - TCP listener that accepts incoming connections.
//!
//! The Gateway binds one socket and spawns a Connection task for each
//! incoming client. Accept errors are logged and never stop the loop.

use crate::network::Connection;
use crate::state::Hub;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, instrument};

/// Accepts incoming TCP connections and spawns handlers.
pub struct Gateway {
    listener: TcpListener,
    hub: Arc<Hub>,
}

impl Gateway {
    /// Bind the gateway to the specified address.
    pub async fn bind(addr: SocketAddr, hub: Arc<Hub>) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!(%addr, "Listener bound");
        Ok(Self { listener, hub })
    }

    /// The address actually bound (resolves port 0 for tests).
    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Run the gateway, accepting connections forever.
    #[instrument(skip(self), name = "gateway")]
    pub async fn run(self) -> anyhow::Result<()> {
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let hub = Arc::clone(&self.hub);
                    let id = hub.conn_ids.next();
                    info!(id, %addr, "Connection accepted");

                    tokio::spawn(async move {
                        let connection = Connection::new(id, stream, addr, hub);
                        if let Err(e) = connection.run().await {
                            error!(id, %addr, error = %e, "Connection error");
                        }
                        info!(id, %addr, "Connection closed");
                    });
                }
                Err(e) => {
                    error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }
}
