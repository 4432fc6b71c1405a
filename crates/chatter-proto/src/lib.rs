//! # chatter-proto
//!
//! Protocol library for the chatterd chat daemon.
//!
//! The wire protocol is newline-delimited UTF-8 text. A `/sendfile` command
//! switches the sender's stream to a raw binary payload of exactly the
//! declared size, after which the stream reverts to line mode. This crate
//! provides:
//!
//! - [`Command`]: the decoded command grammar (one tagged variant per
//!   command, decoded once and matched exhaustively by the server)
//! - [`ChatCodec`]: a tokio-util codec that frames lines and, on demand,
//!   fixed-size binary payloads
//! - [`colors`]: ANSI color helpers for server replies
//!
//! The crate knows nothing about sessions or routing; that lives in the
//! daemon.

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod codec;
pub mod colors;
pub mod command;
pub mod error;

pub use codec::{ChatCodec, Frame};
pub use command::Command;
pub use error::{CommandError, ProtocolError};
