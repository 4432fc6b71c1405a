//! Protocol error types.

use thiserror::Error;

/// Errors produced by the wire codec.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Underlying transport failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A line exceeded the configured maximum length.
    #[error("line too long: {actual} bytes (limit {limit})")]
    LineTooLong {
        /// Observed length, including the terminator.
        actual: usize,
        /// Configured limit.
        limit: usize,
    },

    /// A line was not valid UTF-8.
    #[error("line is not valid UTF-8 at byte {byte_pos}")]
    InvalidUtf8 {
        /// Offset of the first invalid byte.
        byte_pos: usize,
    },
}

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors produced while decoding a command line.
///
/// These are grammar-level failures only; name resolution and session
/// checks are the server's business.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The line was empty (or whitespace only).
    #[error("empty line")]
    Empty,

    /// A command was missing required arguments.
    #[error("usage: {0}")]
    Usage(&'static str),

    /// The `/sendfile` size field was not a positive decimal integer.
    #[error("invalid transfer size: {0:?}")]
    InvalidSize(String),
}
