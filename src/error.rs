//! Unified error handling for chatterd.
//!
//! Every user-facing error becomes a reply line to the offending
//! connection; none of them terminate the connection. I/O errors and EOF
//! are handled by the connection loop itself, which tears down that one
//! connection only.

use crate::network::Outbound;
use chatter_proto::{colors, CommandError};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur during command handling.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("no such user: {0}")]
    NotFound(String),

    #[error("username '{0}' is already taken")]
    NameTaken(String),

    #[error("you cannot target yourself")]
    SelfTarget,

    #[error("invalid username: {0:?}")]
    InvalidName(String),

    #[error("invalid transfer size: {0:?}")]
    InvalidSize(String),

    #[error("you already have a transfer in progress")]
    TransferInProgress,

    #[error("{0} is busy with another transfer")]
    PeerBusy(String),

    #[error("file exceeds the transfer size limit of {0} bytes")]
    TooLarge(u64),

    /// The connection's outbound queue is gone; tear down, no reply.
    #[error("send error: {0}")]
    Send(#[from] mpsc::error::SendError<Outbound>),
}

impl HandlerError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Usage(_) => "usage",
            Self::NotFound(_) => "not_found",
            Self::NameTaken(_) => "name_taken",
            Self::SelfTarget => "self_target",
            Self::InvalidName(_) => "invalid_name",
            Self::InvalidSize(_) => "invalid_size",
            Self::TransferInProgress => "transfer_in_progress",
            Self::PeerBusy(_) => "peer_busy",
            Self::TooLarge(_) => "too_large",
            Self::Send(_) => "send_error",
        }
    }

    /// Convert to a reply line for the offending connection.
    ///
    /// Returns `None` for errors that don't warrant a client-visible reply
    /// (a dead outbound queue cannot carry one anyway).
    pub fn to_reply(&self) -> Option<String> {
        match self {
            Self::Send(_) => None,
            other => Some(colors::paint(colors::RED, &format!("error: {other}"))),
        }
    }
}

impl From<CommandError> for HandlerError {
    fn from(e: CommandError) -> Self {
        match e {
            // Empty lines are filtered before dispatch; mapping them to a
            // usage reply keeps the conversion total.
            CommandError::Empty => HandlerError::Usage("<command>"),
            CommandError::Usage(usage) => HandlerError::Usage(usage),
            CommandError::InvalidSize(s) => HandlerError::InvalidSize(s),
        }
    }
}

/// Result type for command handlers.
pub type HandlerResult<T> = Result<T, HandlerError>;
