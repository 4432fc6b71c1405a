//! Line/payload codec for tokio.
//!
//! Decodes newline-terminated UTF-8 lines, and on demand a fixed-size raw
//! binary payload. The server calls [`ChatCodec::begin_payload`] after
//! accepting a `/sendfile` line; the decoder then yields [`Frame::Data`]
//! chunks until exactly the declared byte count has been consumed and
//! reverts to line mode on its own. A read that straddles the payload
//! boundary is split, so trailing bytes are decoded as lines again.

use bytes::{Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::{self, ProtocolError};

/// Default maximum line length in bytes, terminator included.
pub const DEFAULT_MAX_LINE_LEN: usize = 512;

/// One decoded frame from a client connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A complete text line, terminator stripped.
    Line(String),
    /// A chunk of an in-flight binary payload.
    Data(Bytes),
}

/// Codec framing newline-terminated lines and fixed-size payloads.
pub struct ChatCodec {
    /// Index of next byte to check for newline.
    next_index: usize,
    /// Maximum line length.
    max_line_len: usize,
    /// Bytes of raw payload still expected; 0 means line mode.
    payload_remaining: u64,
}

impl ChatCodec {
    /// Create a codec with the default line limit.
    pub fn new() -> Self {
        Self::with_max_line_len(DEFAULT_MAX_LINE_LEN)
    }

    /// Create a codec with a custom maximum line length.
    pub fn with_max_line_len(max_line_len: usize) -> Self {
        Self {
            next_index: 0,
            max_line_len,
            payload_remaining: 0,
        }
    }

    /// Switch to payload mode for the next `size` bytes.
    pub fn begin_payload(&mut self, size: u64) {
        self.payload_remaining = size;
        self.next_index = 0;
    }

    /// Whether the codec is currently consuming a payload.
    pub fn in_payload(&self) -> bool {
        self.payload_remaining > 0
    }
}

impl Default for ChatCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for ChatCodec {
    type Item = Frame;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<Frame>> {
        // Payload mode: hand over whatever arrived, up to the declared size.
        if self.payload_remaining > 0 {
            if src.is_empty() {
                return Ok(None);
            }
            let take = src.len().min(self.payload_remaining as usize);
            let chunk = src.split_to(take).freeze();
            self.payload_remaining -= take as u64;
            return Ok(Some(Frame::Data(chunk)));
        }

        // Line mode: look for a newline starting from where we left off.
        if let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') {
            let line = src.split_to(self.next_index + offset + 1);
            self.next_index = 0;

            if line.len() > self.max_line_len {
                return Err(ProtocolError::LineTooLong {
                    actual: line.len(),
                    limit: self.max_line_len,
                });
            }

            let text = std::str::from_utf8(&line).map_err(|e| ProtocolError::InvalidUtf8 {
                byte_pos: e.valid_up_to(),
            })?;
            Ok(Some(Frame::Line(
                text.trim_end_matches(['\r', '\n']).to_string(),
            )))
        } else {
            // No complete line yet - remember where we stopped.
            self.next_index = src.len();

            if src.len() > self.max_line_len {
                return Err(ProtocolError::LineTooLong {
                    actual: src.len(),
                    limit: self.max_line_len,
                });
            }

            Ok(None)
        }
    }
}

impl Encoder<String> for ChatCodec {
    type Error = ProtocolError;

    fn encode(&mut self, line: String, dst: &mut BytesMut) -> error::Result<()> {
        dst.extend_from_slice(line.as_bytes());
        dst.extend_from_slice(b"\n");
        Ok(())
    }
}

impl Encoder<Bytes> for ChatCodec {
    type Error = ProtocolError;

    fn encode(&mut self, data: Bytes, dst: &mut BytesMut) -> error::Result<()> {
        dst.extend_from_slice(&data);
        Ok(())
    }
}
