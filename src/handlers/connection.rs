//! Registration and identity handlers: first-line username, /nick, /quit.

use super::{Context, Flow};
use crate::error::{HandlerError, HandlerResult};
use chatter_proto::colors;
use tracing::info;

/// Validates a username.
///
/// 1-30 characters, ASCII alphanumerics plus a small punctuation set,
/// not starting with a digit. Names never contain whitespace (they are
/// single tokens in the grammar) or a leading `/` (reserved for
/// commands).
pub fn is_valid_name(name: &str) -> bool {
    if name.is_empty() || name.len() > 30 {
        return false;
    }

    let first = name.chars().next().unwrap();
    if first.is_ascii_digit() || first == '/' {
        return false;
    }

    name.chars().all(|c| {
        c.is_ascii_alphanumeric()
            || c == '_'
            || c == '-'
            || matches!(c, '[' | ']' | '\\' | '`' | '^' | '{' | '}' | '|')
    })
}

/// Handle the first line of an unregistered connection: the username.
///
/// A rejected name keeps the connection open so the client can retry.
pub async fn register(ctx: &mut Context<'_>, line: &str) -> HandlerResult<Flow> {
    let name = line.trim();
    if name.is_empty() {
        return Ok(Flow::Continue);
    }
    if !is_valid_name(name) {
        return Err(HandlerError::InvalidName(name.to_string()));
    }

    ctx.hub
        .registry
        .register(name, ctx.id)
        .map_err(|_| HandlerError::NameTaken(name.to_string()))?;
    ctx.session.write().await.name = Some(name.to_string());

    info!(id = ctx.id, name = %name, "User registered");

    ctx.reply(colors::paint(
        colors::GREEN,
        &format!("you are now known as {name}; /help lists commands"),
    ))
    .await?;
    ctx.hub
        .broadcast_notice_except(ctx.id, &format!("{name} has joined the chat"))
        .await;

    Ok(Flow::Continue)
}

/// Handle `/nick <name>`: atomically swap the username.
pub async fn nick(ctx: &mut Context<'_>, new: &str) -> HandlerResult<Flow> {
    if !is_valid_name(new) {
        return Err(HandlerError::InvalidName(new.to_string()));
    }

    let old = ctx.name().await;
    // On conflict the registry is untouched and the old name stays bound.
    ctx.hub
        .registry
        .rename(new, ctx.id)
        .map_err(|_| HandlerError::NameTaken(new.to_string()))?;
    ctx.session.write().await.name = Some(new.to_string());

    info!(id = ctx.id, old = %old, new = %new, "User renamed");

    ctx.reply(colors::paint(
        colors::PURPLE,
        &format!("your username is now {new}"),
    ))
    .await?;
    ctx.hub
        .broadcast_notice_except(ctx.id, &format!("{old} is now known as {new}"))
        .await;

    Ok(Flow::Continue)
}

/// Handle `/quit`: farewell, then let teardown announce the departure.
pub async fn quit(ctx: &mut Context<'_>) -> HandlerResult<Flow> {
    ctx.reply(colors::paint(colors::CYAN, "goodbye!")).await?;
    Ok(Flow::Quit)
}
