//! Server configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the relay server.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind (default `"127.0.0.1"`).
    pub host: String,
    /// Port to bind (default `0` for auto-assign).
    pub port: u16,
    /// Max inbound WebSocket message size in bytes.
    pub max_message_size: usize,
    /// How long a client may stay silent before it is disconnected, in
    /// seconds. Any inbound frame (including a Pong) resets the clock.
    pub pong_timeout_secs: u64,
    /// Per-frame write deadline in seconds.
    pub write_timeout_secs: u64,
}

impl ServerConfig {
    /// Liveness deadline for the read loop.
    pub fn pong_timeout(&self) -> Duration {
        Duration::from_secs(self.pong_timeout_secs)
    }

    /// Deadline for a single outbound frame write.
    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }

    /// Interval between keepalive Ping frames.
    ///
    /// Nine tenths of the pong timeout, so a healthy client always has a
    /// ping to answer before its liveness deadline expires. Clamped to at
    /// least one millisecond: `tokio::time::interval` panics on zero, and a
    /// zero pong timeout must not take the write loop down with it.
    pub fn ping_interval(&self) -> Duration {
        Duration::from_millis(self.pong_timeout_secs.saturating_mul(900).max(1))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0,
            max_message_size: 512,
            pong_timeout_secs: 60,
            write_timeout_secs: 10,
        }
    }
}
