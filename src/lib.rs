//! chatterd - a line-protocol chat daemon with in-band file transfer.
//!
//! Clients connect over TCP, register a username, and exchange broadcast
//! and private messages. A `/sendfile` command diverts the sender's stream
//! into a raw binary payload that is persisted and forwarded to the
//! recipient over the same kind of connection.
//!
//! The daemon is also usable as a library so the integration suite can run
//! a server in-process; `main.rs` is a thin wrapper.

pub mod config;
pub mod error;
pub mod handlers;
pub mod network;
pub mod state;
pub mod storage;
pub mod transfer;
