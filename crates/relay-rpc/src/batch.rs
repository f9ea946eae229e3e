//! Single-vs-batch message handling with concurrent fan-out.
//!
//! A message whose first non-whitespace byte is `[` is a batch; everything
//! else is treated as a single request. Batch items are dispatched
//! concurrently and their responses placed back at the item's input index,
//! so the output array always mirrors the input array's order and length.

use std::sync::Arc;

use serde::Serialize;
use serde_json::value::RawValue;
use tracing::{error, instrument};

use crate::context::RequestContext;
use crate::errors::{ErrorCode, ErrorObject};
use crate::registry::MethodRegistry;
use crate::types::Response;

/// Outbound payload shape: one object for a single request, an array for a
/// batch. Serializes without a tag so the asymmetry is visible on the wire.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Outgoing {
    /// Response to a single request (or to an undecodable batch).
    Single(Response),
    /// Responses to a batch, in input order.
    Batch(Vec<Response>),
}

/// Handle one inbound text message, single or batch.
///
/// A batch that cannot be split into elements yields a *single* parse-error
/// object, not an array: no per-item responses exist when the array itself
/// is malformed. An empty batch yields an empty array.
#[instrument(skip_all, fields(client_id = %ctx.client_id))]
pub async fn handle_message(
    registry: &Arc<MethodRegistry>,
    ctx: &RequestContext,
    text: &str,
) -> Outgoing {
    let trimmed = text.trim_start();
    if !trimmed.starts_with('[') {
        return Outgoing::Single(registry.dispatch(ctx, trimmed).await);
    }

    let items: Vec<&RawValue> = match serde_json::from_str(trimmed) {
        Ok(items) => items,
        Err(e) => {
            return Outgoing::Single(Response::error(
                String::new(),
                ErrorObject::with_data(ErrorCode::ParseError, e.to_string()),
            ));
        }
    };

    let handles: Vec<_> = items
        .into_iter()
        .map(|item| {
            let registry = Arc::clone(registry);
            let ctx = ctx.clone();
            let raw = item.get().to_owned();
            tokio::spawn(async move { registry.dispatch(&ctx, &raw).await })
        })
        .collect();

    let mut responses = Vec::with_capacity(handles.len());
    for handle in handles {
        match handle.await {
            Ok(response) => responses.push(response),
            Err(e) => {
                error!(error = %e, "batch dispatch task failed");
                responses.push(Response::error(
                    String::new(),
                    ErrorObject::new(ErrorCode::InternalError),
                ));
            }
        }
    }
    Outgoing::Batch(responses)
}
