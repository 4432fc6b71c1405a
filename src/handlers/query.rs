//! Query handlers: /who and /help.

use super::{Context, Flow};
use crate::error::HandlerResult;
use chatter_proto::colors;

/// Handle `/who`: list every registered username.
pub async fn who(ctx: &mut Context<'_>) -> HandlerResult<Flow> {
    let mut names = ctx.hub.registry.names();
    names.sort();
    ctx.reply(colors::paint(
        colors::BLUE,
        &format!("users online ({}): {}", names.len(), names.join(", ")),
    ))
    .await?;
    Ok(Flow::Continue)
}

/// Handle `/help`: static command summary.
pub async fn help(ctx: &mut Context<'_>) -> HandlerResult<Flow> {
    const HELP: &[&str] = &[
        "available commands:",
        "  /msg <user> <message>             - send a private message",
        "  /who                              - list online users",
        "  /nick <name>                      - change your username",
        "  /sendfile <user> <file> <size>    - send a file (raw bytes follow)",
        "  /quit                             - leave the chat",
        "  /help                             - show this help",
        "anything else is broadcast to everyone.",
    ];
    for line in HELP {
        ctx.reply(colors::paint(colors::CYAN, line)).await?;
    }
    Ok(Flow::Continue)
}
