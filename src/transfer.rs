//! Transfer engine: raw-byte accumulation and completion.
//!
//! While a session is `Sending`, the connection loop feeds every raw
//! chunk here instead of the line parser. Chunks accumulate in arrival
//! order; once the declared size is reached the payload is persisted,
//! forwarded to the recipient (if still connected), and acknowledged to
//! the sender, and both sessions return to `Idle`.

use crate::error::HandlerResult;
use crate::network::Outbound;
use crate::state::{ConnId, Hub, Session, TransferState};
use bytes::Bytes;
use chatter_proto::colors;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info, warn};

/// A completed upload, ready to finalize.
struct CompletedUpload {
    from: String,
    to: String,
    filename: String,
    data: Bytes,
}

/// Append one raw chunk to the session's in-flight upload.
///
/// Returns after acknowledging completion; partial uploads return
/// immediately.
pub async fn ingest(
    hub: &Arc<Hub>,
    session: &Arc<RwLock<Session>>,
    sender: &mpsc::Sender<Outbound>,
    chunk: Bytes,
) -> HandlerResult<()> {
    let completed = {
        let mut guard = session.write().await;
        let id = guard.id;
        let from = guard.display_name().to_string();

        let TransferState::Sending { size, buffered, .. } = &mut guard.transfer else {
            // The codec only emits data frames while an upload is active;
            // a stray chunk means the states disagree. Drop it.
            warn!(id, bytes = chunk.len(), "Discarding stray payload chunk");
            return Ok(());
        };

        buffered.extend_from_slice(&chunk);
        debug!(
            id,
            received = buffered.len(),
            expected = *size,
            "Transfer chunk accumulated"
        );
        if (buffered.len() as u64) < *size {
            return Ok(());
        }

        let TransferState::Sending {
            to,
            filename,
            buffered,
            ..
        } = guard.transfer.take()
        else {
            unreachable!("transfer state checked above");
        };
        CompletedUpload {
            from,
            to,
            filename,
            data: buffered.freeze(),
        }
    };

    finalize(hub, sender, completed).await
}

/// Persist, forward, and acknowledge a completed upload.
async fn finalize(
    hub: &Arc<Hub>,
    sender: &mpsc::Sender<Outbound>,
    upload: CompletedUpload,
) -> HandlerResult<()> {
    let CompletedUpload {
        from,
        to,
        filename,
        data,
    } = upload;

    info!(
        from = %from,
        to = %to,
        file = %filename,
        bytes = data.len(),
        "File transfer complete"
    );

    // Persistence failure is the collaborator's to log; the protocol
    // exchange carries on.
    if let Err(e) = hub.store.persist(&filename, data.clone()).await {
        warn!(file = %filename, error = %e, "Failed to persist received file");
    }

    // Forward to the recipient, unless they disconnected mid-upload. No
    // retry, no queuing.
    match hub.registry.lookup(&to) {
        Some(peer) => {
            hub.notice(
                peer,
                colors::paint(
                    colors::ORANGE,
                    &format!(
                        "incoming file '{}' from {} ({} bytes)",
                        filename,
                        from,
                        data.len()
                    ),
                ),
            )
            .await;
            hub.send_to(peer, Outbound::Data(data)).await;
            reset_receiving(hub, peer, &from).await;
        }
        None => {
            info!(to = %to, file = %filename, "Recipient disconnected; forwarding skipped");
        }
    }

    sender
        .send(Outbound::Line(colors::paint(
            colors::GREEN,
            &format!("file '{filename}' sent successfully"),
        )))
        .await?;
    Ok(())
}

/// Clear a recipient's `Receiving` marker for a transfer from `from`.
async fn reset_receiving(hub: &Arc<Hub>, peer: ConnId, from: &str) {
    if let Some(peer_session) = hub.session(peer) {
        let mut guard = peer_session.write().await;
        if matches!(&guard.transfer, TransferState::Receiving { from: f, .. } if f == from) {
            guard.transfer = TransferState::Idle;
        }
    }
}

/// Abort any transfer the disconnecting session participates in.
///
/// A sender vanishing mid-upload drops the accumulated bytes: nothing is
/// persisted, nothing is forwarded, and the recipient is released and
/// told. A recipient vanishing needs no action here; the sender's upload
/// completes and forwarding is skipped at finalize time.
pub async fn abort_for_disconnect(hub: &Arc<Hub>, session: &Arc<RwLock<Session>>) {
    let (id, name, aborted) = {
        let mut guard = session.write().await;
        let name = guard.display_name().to_string();
        let aborted = matches!(guard.transfer, TransferState::Sending { .. })
            .then(|| guard.transfer.take());
        (guard.id, name, aborted)
    };

    let Some(TransferState::Sending {
        to,
        filename,
        buffered,
        ..
    }) = aborted
    else {
        return;
    };

    info!(
        id,
        from = %name,
        to = %to,
        file = %filename,
        dropped = buffered.len(),
        "Transfer aborted by disconnect"
    );

    if let Some(peer) = hub.registry.lookup(&to) {
        reset_receiving(hub, peer, &name).await;
        hub.notice(
            peer,
            colors::paint(
                colors::RED,
                &format!("transfer of '{filename}' from {name} was aborted"),
            ),
        )
        .await;
    }
}
