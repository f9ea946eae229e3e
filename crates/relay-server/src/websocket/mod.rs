//! WebSocket transport: per-client connection handles and session loops.

pub mod connection;
pub mod session;
