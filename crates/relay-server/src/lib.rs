//! # relay-server
//!
//! WebSocket transport for the relay JSON-RPC dispatcher.
//!
//! - [`server::RelayServer`]: Axum router with `/health` and `/ws`, bound via
//!   [`server::RelayServer::listen`]
//! - [`websocket::session`]: per-connection read loop with a liveness
//!   deadline, plus a dedicated write task that owns the socket's send half
//! - [`shutdown::ShutdownCoordinator`]: cancellation fan-out for graceful
//!   teardown
//!
//! Protocol semantics (envelopes, registry, batching) live in `relay-rpc`;
//! this crate only moves frames.

#![deny(unsafe_code)]

pub mod config;
pub mod health;
pub mod server;
pub mod shutdown;
pub mod websocket;

pub use config::ServerConfig;
pub use server::RelayServer;
pub use shutdown::ShutdownCoordinator;
