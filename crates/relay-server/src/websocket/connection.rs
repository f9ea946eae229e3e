//! WebSocket client connection handle.

use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use relay_rpc::Outgoing;

/// Handle to a connected client's outbound queue.
///
/// Dispatch tasks hold clones of this and push their payloads through it;
/// the session's write task drains the other end. `send` waits when the
/// queue is full, so a slow socket applies backpressure to dispatch rather
/// than dropping responses.
pub struct ClientConnection {
    /// Unique connection ID.
    pub id: String,
    tx: mpsc::Sender<Outgoing>,
    /// When this connection was established.
    pub connected_at: Instant,
}

impl ClientConnection {
    /// Create a new connection handle.
    pub fn new(id: String, tx: mpsc::Sender<Outgoing>) -> Self {
        Self {
            id,
            tx,
            connected_at: Instant::now(),
        }
    }

    /// Queue an outbound payload, waiting for space when the queue is full.
    ///
    /// Returns `false` once the write task has gone away; the payload is
    /// silently discarded in that case.
    pub async fn send(&self, payload: Outgoing) -> bool {
        self.tx.send(payload).await.is_ok()
    }

    /// Connection age.
    pub fn age(&self) -> Duration {
        self.connected_at.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_rpc::Response;
    use serde_json::json;

    fn payload(id: &str) -> Outgoing {
        Outgoing::Single(Response::success(id, json!(true)))
    }

    fn make_connection(capacity: usize) -> (ClientConnection, mpsc::Receiver<Outgoing>) {
        let (tx, rx) = mpsc::channel(capacity);
        (ClientConnection::new("conn_1".into(), tx), rx)
    }

    #[tokio::test]
    async fn send_delivers_to_receiver() {
        let (conn, mut rx) = make_connection(8);
        assert!(conn.send(payload("a")).await);
        let got = rx.recv().await.unwrap();
        assert_eq!(got, Outgoing::Single(Response::success("a", json!(true))));
    }

    #[tokio::test]
    async fn send_after_writer_gone_returns_false() {
        let (conn, rx) = make_connection(8);
        drop(rx);
        assert!(!conn.send(payload("a")).await);
    }

    #[tokio::test]
    async fn full_queue_blocks_until_drained() {
        let (conn, mut rx) = make_connection(1);
        assert!(conn.send(payload("first")).await);

        // The second send parks until the receiver makes room.
        let sender = tokio::spawn(async move {
            let ok = conn.send(payload("second")).await;
            (conn, ok)
        });

        let first = rx.recv().await.unwrap();
        assert_eq!(first, Outgoing::Single(Response::success("first", json!(true))));

        let (_conn, ok) = sender.await.unwrap();
        assert!(ok);
        let second = rx.recv().await.unwrap();
        assert_eq!(second, Outgoing::Single(Response::success("second", json!(true))));
    }

    #[test]
    fn age_increases() {
        let (conn, _rx) = make_connection(1);
        let a = conn.age();
        std::thread::sleep(Duration::from_millis(5));
        assert!(conn.age() > a);
    }
}
