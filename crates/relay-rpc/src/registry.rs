//! Method registry and single-request dispatch.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use metrics::counter;
use serde_json::Value;
use tracing::{debug, warn};

use crate::context::RequestContext;
use crate::errors::{self, ErrorCode, ErrorObject};
use crate::types::{Request, Response};

/// Trait implemented by every RPC method handler.
///
/// A handler returns either a result value or an error object, never both;
/// the dispatcher passes a handler's error through to the wire unmodified,
/// so handlers pick their own codes (typically invalid-request, application,
/// or domain-specific ones).
#[async_trait]
pub trait MethodHandler: Send + Sync {
    /// Execute the handler for a decoded request.
    async fn handle(&self, ctx: &RequestContext, request: &Request) -> Result<Value, ErrorObject>;
}

/// Registry mapping method names to handlers.
///
/// Built once before a server starts serving; lookups afterwards are
/// lock-free and safe from any number of concurrent dispatch tasks.
pub struct MethodRegistry {
    handlers: HashMap<String, Arc<dyn MethodHandler>>,
}

impl MethodRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler for a method name.
    ///
    /// # Panics
    ///
    /// Panics if `method` is already registered. Duplicate registration is a
    /// startup-time programming error, not a runtime condition.
    pub fn register(&mut self, method: &str, handler: impl MethodHandler + 'static) {
        let previous = self.handlers.insert(method.to_owned(), Arc::new(handler));
        assert!(
            previous.is_none(),
            "handler already registered for method '{method}'"
        );
    }

    /// Look up the handler for a method name.
    pub fn resolve(&self, method: &str) -> Option<&Arc<dyn MethodHandler>> {
        self.handlers.get(method)
    }

    /// Check whether a method is registered.
    pub fn has_method(&self, method: &str) -> bool {
        self.handlers.contains_key(method)
    }

    /// List all registered method names (sorted).
    pub fn methods(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Dispatch one raw request envelope to its handler.
    ///
    /// Every failure path terminates in a well-formed [`Response`]:
    /// - decode failure → classified error (parse / invalid params /
    ///   internal) with the decoder message as `data` and an empty `id`,
    ///   since none could be safely extracted;
    /// - unknown method → method-not-found with the decoded `id`;
    /// - handler error → passed through unmodified with the decoded `id`.
    pub async fn dispatch(&self, ctx: &RequestContext, raw: &str) -> Response {
        let request: Request = match serde_json::from_str(raw) {
            Ok(r) => r,
            Err(e) => {
                let code = errors::classify(&e);
                warn!(code = code.code(), "failed to decode request envelope");
                counter!("rpc_errors_total", "error_type" => "decode").increment(1);
                return Response::error(String::new(), ErrorObject::with_data(code, e.to_string()));
            }
        };

        counter!("rpc_requests_total", "method" => request.method.clone()).increment(1);
        debug!(method = %request.method, id = %request.id, "dispatching RPC");

        let Some(handler) = self.resolve(&request.method) else {
            warn!(method = %request.method, "unknown RPC method");
            counter!("rpc_errors_total", "error_type" => "method_not_found").increment(1);
            return Response::error(request.id, ErrorObject::new(ErrorCode::MethodNotFound));
        };

        match handler.handle(ctx, &request).await {
            Ok(result) => Response::success(request.id, result),
            Err(error) => {
                counter!("rpc_errors_total", "error_type" => "handler").increment(1);
                Response::error(request.id, error)
            }
        }
    }
}

impl Default for MethodRegistry {
    fn default() -> Self {
        Self::new()
    }
}
