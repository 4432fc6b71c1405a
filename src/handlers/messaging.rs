//! Message delivery handlers: private messages and broadcast chat.

use super::{Context, Flow};
use crate::error::{HandlerError, HandlerResult};
use crate::network::Outbound;
use chatter_proto::colors;
use tracing::debug;

/// Handle `/msg <user> <text>`: deliver to one user, echo a confirmation.
pub async fn privmsg(ctx: &mut Context<'_>, to: &str, text: &str) -> HandlerResult<Flow> {
    let from = ctx.name().await;
    if to == from {
        return Err(HandlerError::SelfTarget);
    }

    let Some(peer) = ctx.hub.registry.lookup(to) else {
        return Err(HandlerError::NotFound(to.to_string()));
    };

    debug!(from = %from, to = %to, "Private message");

    ctx.hub
        .send_to(
            peer,
            Outbound::Line(colors::paint(
                colors::GREEN,
                &format!("private from {from}: {text}"),
            )),
        )
        .await;
    ctx.reply(colors::paint(
        colors::ORANGE,
        &format!("private to {to}: {text}"),
    ))
    .await?;

    Ok(Flow::Continue)
}

/// Handle plain chat: broadcast to everyone else.
pub async fn broadcast(ctx: &mut Context<'_>, text: &str) -> HandlerResult<Flow> {
    let from = ctx.name().await;
    debug!(from = %from, "Broadcast message");
    ctx.hub.broadcast_from(ctx.id, &from, text).await;
    Ok(Flow::Continue)
}
