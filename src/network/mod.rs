//! Network layer: the listening gateway and per-connection tasks.

mod connection;
mod gateway;

pub use connection::Connection;
pub use gateway::Gateway;

use bytes::Bytes;

/// One queued item for a connection's writer.
///
/// Each destination connection's write path is serialized through its
/// own queue, so concurrent senders can never interleave bytes on the
/// wire.
#[derive(Debug, Clone)]
pub enum Outbound {
    /// A text line; the writer appends the terminator.
    Line(String),
    /// Raw bytes, forwarded verbatim (file payloads).
    Data(Bytes),
}
