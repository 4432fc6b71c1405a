//! File transfer initiation: /sendfile.
//!
//! Marks the sender `Sending` and the recipient `Receiving`, then tells
//! the connection loop to divert the sender's stream into payload mode.
//! Accumulation and completion live in [`crate::transfer`].

use super::{Context, Flow};
use crate::error::{HandlerError, HandlerResult};
use crate::state::TransferState;
use bytes::BytesMut;
use chatter_proto::colors;
use tracing::info;

/// Handle `/sendfile <user> <filename> <size>`.
pub async fn start(
    ctx: &mut Context<'_>,
    to: String,
    filename: String,
    size: u64,
) -> HandlerResult<Flow> {
    if size > ctx.hub.limits.max_transfer_size {
        return Err(HandlerError::TooLarge(ctx.hub.limits.max_transfer_size));
    }

    let from = ctx.name().await;
    if to == from {
        return Err(HandlerError::SelfTarget);
    }

    let Some(peer) = ctx.hub.registry.lookup(&to) else {
        return Err(HandlerError::NotFound(to));
    };

    // Strictly one transfer in flight per sender; no interleaving.
    if !ctx.session.read().await.transfer.is_idle() {
        return Err(HandlerError::TransferInProgress);
    }

    // Mark the recipient first, under its own lock, so two simultaneous
    // senders cannot both claim it. Only one session lock is ever held
    // at a time.
    {
        let Some(peer_session) = ctx.hub.session(peer) else {
            return Err(HandlerError::NotFound(to));
        };
        let mut guard = peer_session.write().await;
        if !guard.transfer.is_idle() {
            return Err(HandlerError::PeerBusy(to));
        }
        guard.transfer = TransferState::Receiving {
            from: from.clone(),
            filename: filename.clone(),
            size,
        };
    }

    // Our own transfer state is only ever touched by this task, so the
    // idle check above still holds here.
    ctx.session.write().await.transfer = TransferState::Sending {
        to: to.clone(),
        filename: filename.clone(),
        size,
        buffered: BytesMut::with_capacity(size.min(64 * 1024) as usize),
    };

    info!(
        from = %from,
        to = %to,
        file = %filename,
        bytes = size,
        "File transfer started"
    );

    ctx.hub
        .notice(
            peer,
            colors::paint(
                colors::ORANGE,
                &format!("{from} is sending you file '{filename}' ({size} bytes)"),
            ),
        )
        .await;
    ctx.reply(colors::paint(
        colors::GREEN,
        &format!("ready for '{filename}'; send {size} raw bytes now"),
    ))
    .await?;

    Ok(Flow::BeginUpload { size })
}
