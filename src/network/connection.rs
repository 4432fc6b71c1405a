//! Connection - handles an individual client connection.
//!
//! Each Connection runs in its own Tokio task: a `tokio::select!` loop
//! over framed reads and this connection's outbound queue. The read side
//! consults session state through the codec mode: while an upload is in
//! flight, frames are raw payload chunks for the transfer engine;
//! otherwise they are text lines for the dispatcher. A failure on either
//! side tears down this connection only - the accept loop and every other
//! connection keep running.

use crate::handlers::{self, Context, Flow};
use crate::network::Outbound;
use crate::state::{ConnId, Hub, Session};
use crate::transfer;
use chatter_proto::{colors, ChatCodec, Frame};
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, RwLock};
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, info, instrument, warn};

/// A client connection handler.
pub struct Connection {
    id: ConnId,
    addr: SocketAddr,
    hub: Arc<Hub>,
    stream: TcpStream,
}

impl Connection {
    /// Create a new connection handler.
    pub fn new(id: ConnId, stream: TcpStream, addr: SocketAddr, hub: Arc<Hub>) -> Self {
        Self {
            id,
            addr,
            hub,
            stream,
        }
    }

    /// Run the connection loop until the client leaves or fails.
    #[instrument(skip(self), fields(id = self.id, addr = %self.addr), name = "connection")]
    pub async fn run(self) -> anyhow::Result<()> {
        let session = Arc::new(RwLock::new(Session::new(self.id, self.addr)));
        self.hub.sessions.insert(self.id, Arc::clone(&session));

        let (read_half, write_half) = self.stream.into_split();
        let mut reader = FramedRead::new(
            read_half,
            ChatCodec::with_max_line_len(self.hub.limits.max_line_len),
        );
        let mut writer = FramedWrite::new(write_half, ChatCodec::new());

        // Handlers queue replies here; other connections route messages
        // through the same queue via the Hub.
        let (outgoing_tx, mut outgoing_rx) =
            mpsc::channel::<Outbound>(self.hub.limits.outbound_queue);
        self.hub.register_sender(self.id, outgoing_tx.clone());

        let greeting = colors::paint(
            colors::CYAN,
            &format!(
                "welcome to {}; enter a username to join",
                self.hub.server_info.name
            ),
        );
        let _ = outgoing_tx.send(Outbound::Line(greeting)).await;

        loop {
            tokio::select! {
                frame = reader.next() => match frame {
                    Some(Ok(Frame::Line(line))) => {
                        let mut ctx = Context {
                            id: self.id,
                            hub: &self.hub,
                            session: &session,
                            sender: &outgoing_tx,
                        };

                        match handlers::dispatch(&mut ctx, &line).await {
                            Ok(Flow::Continue) => {}
                            Ok(Flow::BeginUpload { size }) => {
                                debug!(size, "Diverting stream to payload mode");
                                reader.decoder_mut().begin_payload(size);
                            }
                            Ok(Flow::Quit) => break,
                            Err(e) => {
                                debug!(code = e.error_code(), error = %e, "Command rejected");
                                match e.to_reply() {
                                    Some(reply) => {
                                        if outgoing_tx.send(Outbound::Line(reply)).await.is_err() {
                                            break;
                                        }
                                    }
                                    // The outbound queue is gone; nothing
                                    // left to say to this client.
                                    None => break,
                                }
                            }
                        }
                    }
                    Some(Ok(Frame::Data(chunk))) => {
                        if let Err(e) = transfer::ingest(&self.hub, &session, &outgoing_tx, chunk).await {
                            warn!(error = %e, "Transfer ingest failed");
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, "Read error");
                        break;
                    }
                    None => {
                        info!("Client disconnected");
                        break;
                    }
                },

                item = outgoing_rx.recv() => match item {
                    Some(Outbound::Line(line)) => {
                        if let Err(e) = writer.send(line).await {
                            warn!(error = %e, "Write error");
                            break;
                        }
                    }
                    Some(Outbound::Data(data)) => {
                        if let Err(e) = writer.send(data).await {
                            warn!(error = %e, "Write error");
                            break;
                        }
                    }
                    None => break,
                },
            }
        }

        self.teardown(&session, &mut outgoing_rx, &mut writer).await;
        Ok(())
    }

    /// Tear down this connection: unroute, flush farewells, abort any
    /// in-flight transfer, free the name, and announce the departure.
    async fn teardown(
        &self,
        session: &Arc<RwLock<Session>>,
        outgoing_rx: &mut mpsc::Receiver<Outbound>,
        writer: &mut FramedWrite<tokio::net::tcp::OwnedWriteHalf, ChatCodec>,
    ) {
        // Stop routing to this connection before draining, so the queue
        // can only shrink from here.
        self.hub.remove_sender(self.id);

        // Best-effort flush of already-queued replies (the /quit farewell
        // lands through this path).
        while let Ok(item) = outgoing_rx.try_recv() {
            let flushed = match item {
                Outbound::Line(line) => writer.send(line).await.is_ok(),
                Outbound::Data(data) => writer.send(data).await.is_ok(),
            };
            if !flushed {
                break;
            }
        }

        transfer::abort_for_disconnect(&self.hub, session).await;

        let connected_at = session.read().await.connected_at;
        let connected_secs = (chrono::Utc::now() - connected_at).num_seconds();

        self.hub.sessions.remove(&self.id);
        if let Some(name) = self.hub.registry.remove(self.id) {
            info!(name = %name, connected_secs, "User left");
            self.hub
                .broadcast_notice_except(self.id, &format!("{name} has left the chat"))
                .await;
        }
        // The socket halves close on drop, exactly once.
    }
}
