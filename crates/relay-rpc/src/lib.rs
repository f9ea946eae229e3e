//! # relay-rpc
//!
//! JSON-RPC 2.0 protocol core for the relay WebSocket server.
//!
//! - Wire types: [`types::Request`], [`types::Response`] (result *or* error,
//!   `jsonrpc: "2.0"` marker)
//! - Error taxonomy: the fixed JSON-RPC code/message table in [`errors`]
//! - [`registry::MethodRegistry`]: name → handler lookup, built once before
//!   serving, lock-free afterwards
//! - [`batch::handle_message`]: single-vs-batch detection, concurrent fan-out
//!   with input-order fan-in
//!
//! The transport (WebSocket upgrade, framing, keepalive) lives in
//! `relay-server`; this crate never touches a socket.

#![deny(unsafe_code)]

pub mod batch;
pub mod context;
pub mod errors;
pub mod registry;
pub mod types;

pub use batch::{Outgoing, handle_message};
pub use context::RequestContext;
pub use errors::{ErrorCode, ErrorObject};
pub use registry::{MethodHandler, MethodRegistry};
pub use types::{Request, Response};
