//! Per-dispatch context handed to method handlers.

use tokio_util::sync::CancellationToken;

/// Context available to every handler invocation.
///
/// The cancellation token is tied to the owning connection's lifetime: when
/// the session tears down, in-flight handlers observe the token. Handlers
/// that ignore it simply run to completion and have their responses dropped
/// by the closed session queue.
#[derive(Clone, Debug)]
pub struct RequestContext {
    /// Identifier of the client connection this dispatch belongs to.
    pub client_id: String,
    /// Cancelled when the owning connection shuts down.
    pub cancel: CancellationToken,
}

impl RequestContext {
    /// Context scoped to a connection.
    pub fn new(client_id: impl Into<String>, cancel: CancellationToken) -> Self {
        Self {
            client_id: client_id.into(),
            cancel,
        }
    }

    /// Standalone context with its own token, for tests and direct dispatch.
    pub fn detached() -> Self {
        Self::new("detached", CancellationToken::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detached_context_is_not_cancelled() {
        let ctx = RequestContext::detached();
        assert_eq!(ctx.client_id, "detached");
        assert!(!ctx.cancel.is_cancelled());
    }

    #[test]
    fn clones_share_the_token() {
        let ctx = RequestContext::new("c1", CancellationToken::new());
        let clone = ctx.clone();
        ctx.cancel.cancel();
        assert!(clone.cancel.is_cancelled());
    }
}
