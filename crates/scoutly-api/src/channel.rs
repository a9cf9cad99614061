//! Push channel: WebSocket stream of device change notifications.
//!
//! Connects to the Scout push endpoint and fans parsed [`ChangeEvent`]s
//! out through a [`tokio::sync::broadcast`] channel. Handles reconnection
//! with exponential backoff automatically. This is the only part of the
//! crate that retries anything -- REST calls never do.
//!
//! # Example
//!
//! ```rust,ignore
//! use scoutly_api::channel::{ChannelHandle, ReconnectConfig};
//! use tokio_util::sync::CancellationToken;
//! use url::Url;
//!
//! let cancel = CancellationToken::new();
//! let ws_url = Url::parse("wss://events.scoutalarm.com/devices")?;
//!
//! let handle = ChannelHandle::connect(ws_url, ReconnectConfig::default(), cancel.clone(), None);
//! let mut rx = handle.subscribe();
//!
//! while let Ok(event) = rx.recv().await {
//!     println!("device {} changed", event.id);
//! }
//!
//! handle.shutdown();
//! ```

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_tungstenite::tungstenite::{self, ClientRequestBuilder};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::Error;

// ── Broadcast channel capacity ───────────────────────────────────────

const EVENT_CHANNEL_CAPACITY: usize = 1024;

// ── ChangeEvent ──────────────────────────────────────────────────────

/// A device change notification from the push channel.
///
/// The contract is minimal: every event names the device whose reported
/// state changed server-side. Everything else the vendor sends rides
/// along in `extra` so nothing is silently dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Id of the device whose reported state changed.
    pub id: String,

    /// Event kind, if the vendor labeled it (e.g. `"device-state"`).
    #[serde(default, rename = "event")]
    pub kind: Option<String>,

    /// All remaining fields from the frame.
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

// ── ReconnectConfig ──────────────────────────────────────────────────

/// Exponential backoff configuration for channel reconnection.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Delay before the first reconnection attempt. Default: 1s.
    pub initial_delay: Duration,

    /// Upper bound on backoff delay. Default: 30s.
    pub max_delay: Duration,

    /// Maximum reconnection attempts before giving up.
    /// `None` means retry forever.
    pub max_retries: Option<u32>,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_retries: None,
        }
    }
}

// ── ChannelHandle ────────────────────────────────────────────────────

/// Handle to a running push channel.
///
/// Dropping the handle does not stop the background task; call
/// [`shutdown`](Self::shutdown) (or cancel the token) to tear it down.
pub struct ChannelHandle {
    event_rx: broadcast::Receiver<Arc<ChangeEvent>>,
    cancel: CancellationToken,
}

impl ChannelHandle {
    /// Spawn the connection loop and return immediately.
    ///
    /// The first connection attempt happens asynchronously -- subscribe
    /// to the event receiver to start consuming events. `token` is sent
    /// as the Authorization header on the upgrade request.
    pub fn connect(
        ws_url: Url,
        reconnect: ReconnectConfig,
        cancel: CancellationToken,
        token: Option<String>,
    ) -> Self {
        let (event_tx, event_rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            channel_loop(ws_url, event_tx, reconnect, task_cancel, token).await;
        });

        Self { event_rx, cancel }
    }

    /// Get a new broadcast receiver for the event stream.
    ///
    /// Multiple consumers can subscribe concurrently. If a consumer falls
    /// behind, it receives [`broadcast::error::RecvError::Lagged`].
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<ChangeEvent>> {
        self.event_rx.resubscribe()
    }

    /// Signal the background task to shut down gracefully.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

// ── Background reconnection loop ─────────────────────────────────────

/// Why a single connection ended.
enum Disconnect {
    /// The server closed the stream (close frame or EOF).
    Remote,
    /// Cancellation was requested.
    Cancelled,
}

/// Drive the channel until cancelled: one connection at a time, backing
/// off between failed attempts. A session the server ends cleanly resets
/// the backoff schedule and reconnects immediately.
async fn channel_loop(
    ws_url: Url,
    event_tx: broadcast::Sender<Arc<ChangeEvent>>,
    reconnect: ReconnectConfig,
    cancel: CancellationToken,
    token: Option<String>,
) {
    let mut failures: u32 = 0;

    loop {
        match run_connection(&ws_url, &event_tx, &cancel, token.as_deref()).await {
            Ok(Disconnect::Cancelled) => break,
            Ok(Disconnect::Remote) => {
                tracing::info!("push channel disconnected, reconnecting");
                failures = 0;
            }
            Err(e) => {
                if reconnect.max_retries.is_some_and(|max| failures >= max) {
                    tracing::error!(
                        error = %e,
                        max_retries = ?reconnect.max_retries,
                        "push channel reconnection limit reached, giving up"
                    );
                    break;
                }

                let delay = reconnect_delay(failures, &reconnect);
                tracing::warn!(error = %e, failures, ?delay, "push channel error, backing off");

                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    () = tokio::time::sleep(delay) => {}
                }

                failures += 1;
            }
        }
    }

    tracing::debug!("push channel loop exiting");
}

// ── Single connection lifecycle ──────────────────────────────────────

/// Open one WebSocket connection and pump its frames until it errors,
/// the server closes it, or the token is cancelled.
async fn run_connection(
    url: &Url,
    event_tx: &broadcast::Sender<Arc<ChangeEvent>>,
    cancel: &CancellationToken,
    token: Option<&str>,
) -> Result<Disconnect, Error> {
    tracing::info!(url = %url, "connecting to push channel");

    let uri: tungstenite::http::Uri = url
        .as_str()
        .parse()
        .map_err(|e: tungstenite::http::uri::InvalidUri| Error::ChannelConnect(e.to_string()))?;

    let mut request = ClientRequestBuilder::new(uri);
    if let Some(bearer) = token {
        request = request.with_header("Authorization", bearer);
    }

    let (ws_stream, _response) = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Ok(Disconnect::Cancelled),
        result = tokio_tungstenite::connect_async(request) => {
            result.map_err(|e| Error::ChannelConnect(e.to_string()))?
        }
    };

    tracing::info!("push channel connected");

    // The write half stays bound so tungstenite can flush its automatic
    // pong replies.
    let (_write, mut read) = ws_stream.split();

    loop {
        let frame = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(Disconnect::Cancelled),
            frame = read.next() => frame,
        };

        match frame {
            Some(Ok(tungstenite::Message::Text(text))) => {
                parse_and_broadcast(&text, event_tx);
            }
            Some(Ok(tungstenite::Message::Close(close))) => {
                let reason = close.map(|cf| format!("{} {}", cf.code, cf.reason));
                tracing::info!(
                    reason = reason.as_deref().unwrap_or("(no close payload)"),
                    "push channel closed by server"
                );
                return Ok(Disconnect::Remote);
            }
            // Ping, pong, and binary frames carry nothing routable;
            // tungstenite answers pings on its own.
            Some(Ok(_)) => {}
            Some(Err(e)) => return Err(Error::ChannelConnect(e.to_string())),
            None => {
                tracing::info!("push channel stream ended");
                return Ok(Disconnect::Remote);
            }
        }
    }
}

// ── Message parsing ──────────────────────────────────────────────────

/// Parse a text frame and broadcast the event, if it is one.
///
/// Frames are single JSON objects. Anything without a string `id` field
/// cannot be routed to a device and is dropped with a debug log --
/// failing here would take down the whole channel for one bad frame.
fn parse_and_broadcast(text: &str, event_tx: &broadcast::Sender<Arc<ChangeEvent>>) {
    let event: ChangeEvent = match serde_json::from_str(text) {
        Ok(e) => e,
        Err(e) => {
            tracing::debug!(error = %e, "dropping unroutable push frame");
            return;
        }
    };

    // Ignore send errors -- just means no active subscribers right now
    let _ = event_tx.send(Arc::new(event));
}

// ── Backoff calculation ──────────────────────────────────────────────

/// Knuth's multiplicative hash constant, used to scatter the delay
/// offset across the spread window.
const SPREAD_HASH: u64 = 2_654_435_761;

/// Delay before reconnect attempt `attempt` (zero-based).
///
/// `initial_delay * 2^attempt`, capped at `max_delay`, then offset by up
/// to +-25% so successive delays do not land on exact powers of two. The
/// offset is a pure function of the attempt number, not random -- every
/// client backs off on the same schedule.
fn reconnect_delay(attempt: u32, config: &ReconnectConfig) -> Duration {
    let initial_ms = u64::try_from(config.initial_delay.as_millis()).unwrap_or(u64::MAX);
    let max_ms = u64::try_from(config.max_delay.as_millis()).unwrap_or(u64::MAX);

    let doubled = initial_ms.saturating_mul(1_u64 << attempt.min(32));
    let capped = doubled.min(max_ms);

    let spread = capped / 4;
    let offset = u64::from(attempt).wrapping_mul(SPREAD_HASH) % (2 * spread + 1);

    Duration::from_millis(capped - spread + offset)
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_reconnect_config() {
        let config = ReconnectConfig::default();
        assert_eq!(config.initial_delay, Duration::from_secs(1));
        assert_eq!(config.max_delay, Duration::from_secs(30));
        assert!(config.max_retries.is_none());
    }

    #[test]
    fn backoff_increases_exponentially() {
        let config = ReconnectConfig::default();

        let d0 = reconnect_delay(0, &config);
        let d1 = reconnect_delay(1, &config);
        let d2 = reconnect_delay(2, &config);

        // Each step should roughly double (within the spread band)
        assert!(d1 > d0, "d1 ({d1:?}) should be greater than d0 ({d0:?})");
        assert!(d2 > d1, "d2 ({d2:?}) should be greater than d1 ({d1:?})");
    }

    #[test]
    fn backoff_caps_at_max_delay() {
        let config = ReconnectConfig {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
            max_retries: None,
        };

        let d10 = reconnect_delay(10, &config);
        // The spread can push the delay up to 25% past the cap
        assert!(
            d10 <= Duration::from_millis(12_500),
            "delay at attempt 10 ({d10:?}) should be capped near max_delay"
        );
    }

    #[test]
    fn backoff_spread_stays_within_quarter_band() {
        let config = ReconnectConfig::default();

        for attempt in 0..6 {
            let nominal = 1000_u64.saturating_mul(1 << attempt).min(30_000);
            let delay = u64::try_from(reconnect_delay(attempt, &config).as_millis()).unwrap();

            assert!(
                delay >= nominal - nominal / 4,
                "attempt {attempt}: {delay}ms below the spread band"
            );
            assert!(
                delay <= nominal + nominal / 4,
                "attempt {attempt}: {delay}ms above the spread band"
            );
        }
    }

    #[test]
    fn deserialize_change_event() {
        let json = r#"{
            "id": "device-1",
            "event": "device-state",
            "state": "open",
            "location_id": "loc-1"
        }"#;

        let event: ChangeEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.id, "device-1");
        assert_eq!(event.kind.as_deref(), Some("device-state"));
        // Extra fields should be captured in `extra`
        assert_eq!(event.extra["state"], "open");
        assert_eq!(event.extra["location_id"], "loc-1");
    }

    #[test]
    fn parse_and_broadcast_valid_frame() {
        let (tx, mut rx) = broadcast::channel(16);

        let raw = serde_json::json!({
            "id": "d1",
            "event": "device-state",
            "state": "wet"
        });

        parse_and_broadcast(&raw.to_string(), &tx);

        let event = rx.try_recv().unwrap();
        assert_eq!(event.id, "d1");
        assert_eq!(event.kind.as_deref(), Some("device-state"));
    }

    #[test]
    fn parse_and_broadcast_frame_without_id() {
        let (tx, mut rx) = broadcast::channel::<Arc<ChangeEvent>>(16);

        // A heartbeat-style frame with no device id is unroutable
        parse_and_broadcast(r#"{"event": "heartbeat"}"#, &tx);

        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn parse_and_broadcast_malformed_json() {
        let (tx, mut rx) = broadcast::channel::<Arc<ChangeEvent>>(16);

        parse_and_broadcast("not json at all", &tx);

        // Should not panic, should just log and skip
        assert!(rx.try_recv().is_err());
    }
}
