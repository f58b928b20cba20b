//! NetClock CLI Library
//!
//! Interactive line-protocol client for a NetClock server.

pub mod args;
pub mod client;
pub mod repl;
