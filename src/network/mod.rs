//! Transport adapters for NetClock.
//!
//! Thin shims over the interpreter and codec: a line-oriented TCP protocol
//! and an HTTP API.

pub mod connection;
pub mod http;
