//! Command handlers.
//!
//! One decoded line becomes one [`Command`], dispatched through a single
//! exhaustive `match`. No handler can abort the connection loop by
//! accident: every outcome is a [`Flow`] value or a [`HandlerError`]
//! that turns into a reply line, and the compiler guarantees no command
//! is silently skipped.

mod connection;
mod messaging;
mod query;
mod sendfile;

pub use connection::is_valid_name;

use crate::error::HandlerResult;
use crate::network::Outbound;
use crate::state::{ConnId, Hub, Session};
use chatter_proto::{Command, CommandError};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::debug;

/// Handler context passed to each command handler.
pub struct Context<'a> {
    /// The connection's id.
    pub id: ConnId,
    /// Shared server state.
    pub hub: &'a Arc<Hub>,
    /// This connection's session.
    pub session: &'a Arc<RwLock<Session>>,
    /// Outbound queue for replies to this connection.
    pub sender: &'a mpsc::Sender<Outbound>,
}

impl Context<'_> {
    /// Queue a reply line to this connection.
    pub async fn reply(&self, line: String) -> HandlerResult<()> {
        self.sender.send(Outbound::Line(line)).await?;
        Ok(())
    }

    /// This connection's registered name; handlers for registered-only
    /// commands may rely on it.
    pub async fn name(&self) -> String {
        self.session.read().await.display_name().to_string()
    }
}

/// What the connection loop should do after a line was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep reading lines.
    Continue,
    /// Divert the stream into payload mode for `size` raw bytes.
    BeginUpload {
        /// Declared payload size.
        size: u64,
    },
    /// Graceful disconnect; teardown announces the departure.
    Quit,
}

/// Handle one decoded line from a connection.
pub async fn dispatch(ctx: &mut Context<'_>, line: &str) -> HandlerResult<Flow> {
    // Pre-registration, the first line is the desired username.
    if !ctx.session.read().await.is_registered() {
        return connection::register(ctx, line).await;
    }

    let command = match Command::parse(line) {
        Ok(command) => command,
        Err(CommandError::Empty) => return Ok(Flow::Continue),
        Err(e) => return Err(e.into()),
    };
    debug!(id = ctx.id, command = command.keyword(), "Dispatching command");

    match command {
        Command::Msg { to, text } => messaging::privmsg(ctx, &to, &text).await,
        Command::Say { text } => messaging::broadcast(ctx, &text).await,
        Command::Who => query::who(ctx).await,
        Command::Help => query::help(ctx).await,
        Command::Nick { name } => connection::nick(ctx, &name).await,
        Command::Quit => connection::quit(ctx).await,
        Command::SendFile { to, filename, size } => {
            sendfile::start(ctx, to, filename, size).await
        }
    }
}
