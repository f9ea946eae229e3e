//! WebSocket session lifecycle — handles a single connected client from
//! upgrade through disconnect.
//!
//! Two tasks per client: the read loop (this function) tracks liveness and
//! spawns a dispatch task per inbound message, and the write task owns the
//! socket's send half, interleaving queued responses with keepalive pings.

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use metrics::{counter, gauge, histogram};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use relay_rpc::{ErrorCode, ErrorObject, Outgoing, RequestContext, Response, handle_message};

use super::connection::ClientConnection;
use crate::config::ServerConfig;
use crate::server::AppState;

/// Outbound queue depth per connection.
const OUTBOUND_QUEUE: usize = 128;

/// Run a WebSocket session for a connected client.
///
/// 1. Spawns the write task (responses, keepalive pings, close frames)
/// 2. Reads inbound frames under a liveness deadline; any frame resets it
/// 3. Dispatches each Text/Binary frame on its own task
/// 4. Tears down both halves when the client closes, errs, or goes silent
#[instrument(skip_all, fields(client_id = %client_id))]
pub async fn run_ws_session(ws: WebSocket, client_id: String, state: AppState) {
    let (ws_tx, mut ws_rx) = ws.split();
    let (send_tx, send_rx) = mpsc::channel::<Outgoing>(OUTBOUND_QUEUE);
    let connection = Arc::new(ClientConnection::new(client_id.clone(), send_tx));

    let cancel = state.shutdown.token().child_token();

    info!("client connected");
    counter!("ws_connections_total").increment(1);
    gauge!("ws_connections_active").increment(1.0);
    let _ = state.connections.fetch_add(1, Ordering::Relaxed);

    let writer = tokio::spawn(write_loop(
        ws_tx,
        send_rx,
        state.config.clone(),
        cancel.clone(),
    ));

    let pong_timeout = state.config.pong_timeout();
    let mut deadline = Instant::now() + pong_timeout;

    loop {
        let frame = match tokio::time::timeout_at(deadline, ws_rx.next()).await {
            Err(_) => {
                warn!(timeout = ?pong_timeout, "client silent past liveness deadline, disconnecting");
                break;
            }
            Ok(None) => break,
            Ok(Some(Err(e))) => {
                debug!(error = %e, "websocket read error");
                break;
            }
            Ok(Some(Ok(frame))) => frame,
        };

        // Any inbound frame proves the peer is still there.
        deadline = Instant::now() + pong_timeout;

        let text = match frame {
            Message::Text(t) => t.to_string(),
            Message::Binary(data) => match String::from_utf8(data.to_vec()) {
                Ok(s) => s,
                Err(e) => {
                    // Undecodable bytes still get an answer, like any other
                    // malformed input.
                    debug!(len = data.len(), "non-UTF8 binary frame");
                    let conn = Arc::clone(&connection);
                    let reply = Outgoing::Single(Response::error(
                        String::new(),
                        ErrorObject::with_data(ErrorCode::ParseError, e.to_string()),
                    ));
                    drop(tokio::spawn(async move {
                        let _ = conn.send(reply).await;
                    }));
                    continue;
                }
            },
            Message::Close(_) => {
                info!("client sent close frame");
                break;
            }
            Message::Ping(_) | Message::Pong(_) => continue,
        };

        // Each message is handled off the read loop, so a slow handler never
        // stalls liveness tracking or later messages.
        let registry = Arc::clone(&state.registry);
        let conn = Arc::clone(&connection);
        let ctx = RequestContext::new(client_id.clone(), cancel.clone());
        drop(tokio::spawn(async move {
            let outgoing = handle_message(&registry, &ctx, &text).await;
            if !conn.send(outgoing).await {
                debug!(client_id = %conn.id, "write task gone, response dropped");
            }
        }));
    }

    info!("client disconnected");
    counter!("ws_disconnections_total").increment(1);
    gauge!("ws_connections_active").decrement(1.0);
    histogram!("ws_connection_duration_seconds").record(connection.age().as_secs_f64());
    let _ = state.connections.fetch_sub(1, Ordering::Relaxed);

    cancel.cancel();
    let _ = writer.await;
}

/// Owns the socket's write half.
///
/// Forwards queued payloads, emits keepalive pings, and sends a Close frame
/// when the queue ends or the session is cancelled. After each queued write
/// it drains whatever was already waiting, but never more than that, so a
/// steady flood cannot starve the ping tick or cancellation.
async fn write_loop(
    mut ws_tx: SplitSink<WebSocket, Message>,
    mut rx: mpsc::Receiver<Outgoing>,
    config: ServerConfig,
    cancel: CancellationToken,
) {
    let mut ping = tokio::time::interval(config.ping_interval());
    // The first tick fires immediately; skip it.
    let _ = ping.tick().await;

    'write: loop {
        tokio::select! {
            payload = rx.recv() => {
                let Some(payload) = payload else {
                    let _ = ws_tx.send(Message::Close(None)).await;
                    break;
                };
                if !write_frame(&mut ws_tx, &payload, config.write_timeout()).await {
                    break;
                }
                let backlog = rx.len();
                for _ in 0..backlog {
                    let Ok(payload) = rx.try_recv() else { break };
                    if !write_frame(&mut ws_tx, &payload, config.write_timeout()).await {
                        break 'write;
                    }
                }
            }
            _ = ping.tick() => {
                let send = ws_tx.send(Message::Ping(vec![].into()));
                match tokio::time::timeout(config.write_timeout(), send).await {
                    Ok(Ok(())) => {}
                    _ => break,
                }
            }
            () = cancel.cancelled() => {
                let _ = ws_tx.send(Message::Close(None)).await;
                break;
            }
        }
    }
}

/// Serialize and send one payload, bounded by the write deadline.
///
/// Returns `false` when the socket should be abandoned. A payload that fails
/// to serialize is skipped rather than killing the connection.
async fn write_frame(
    ws_tx: &mut SplitSink<WebSocket, Message>,
    payload: &Outgoing,
    write_timeout: Duration,
) -> bool {
    let json = match serde_json::to_string(payload) {
        Ok(json) => json,
        Err(e) => {
            warn!(error = %e, "failed to serialize outbound payload");
            return true;
        }
    };
    match tokio::time::timeout(write_timeout, ws_tx.send(Message::Text(json.into()))).await {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            debug!(error = %e, "websocket write failed");
            false
        }
        Err(_) => {
            warn!(timeout = ?write_timeout, "websocket write timed out");
            false
        }
    }
}
