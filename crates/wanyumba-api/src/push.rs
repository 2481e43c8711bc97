//! Push channel with auto-reconnect.
//!
//! Connects to the admin API's WebSocket endpoint, subscribes to the
//! `scraping_status` channel, and streams decoded [`PushMessage`]s through
//! a [`tokio::sync::broadcast`] channel. Reconnection uses exponential
//! backoff with jitter; every (re)established connection issues exactly one
//! subscription request, after which the server is expected to answer with
//! a `full_status` bulk resync.
//!
//! Frames that fail to decode -- malformed JSON, a `scraping_status`
//! missing `target_site` or `data`, or an unrecognized `type` -- are
//! dropped silently by design: nothing reaches user-facing state, only a
//! `debug!` trace for operators.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;
use tokio_tungstenite::tungstenite::{self, ClientRequestBuilder};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::Error;

// ── Channel constants ────────────────────────────────────────────────

/// Logical channel the console subscribes to.
pub const CHANNEL: &str = "scraping_status";

const MESSAGE_CHANNEL_CAPACITY: usize = 256;

// ── SiteStatus ───────────────────────────────────────────────────────

/// Scraper status payload for a single target site.
///
/// The scraper fleet evolves its payload faster than the console ships,
/// so everything beyond the core fields is carried in `extra` verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteStatus {
    /// Current phase, e.g. `"idle"`, `"running"`, `"failed"`.
    #[serde(default)]
    pub phase: Option<String>,

    /// Listings collected in the current or last run.
    #[serde(default)]
    pub listings_found: Option<u64>,

    /// ISO-8601 timestamps from the scraper, passed through untouched.
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub finished_at: Option<String>,

    /// Human-readable progress or failure message, if present.
    #[serde(default)]
    pub message: Option<String>,

    /// All remaining fields the scraper sends.
    #[serde(flatten)]
    pub extra: Value,
}

// ── PushMessage ──────────────────────────────────────────────────────

/// A decoded message from the push channel.
///
/// Decoding happens once, here at the channel boundary; consumers only
/// ever see checked variants.
#[derive(Debug, Clone)]
pub enum PushMessage {
    /// Incremental status for one site. `site` is the lower-cased
    /// `target_site` -- the store key.
    ScrapingStatus { site: String, status: SiteStatus },

    /// Bulk resynchronization: a mapping from site key to status-or-null
    /// that replaces the entire scraper sub-tree. Sent by the server after
    /// every (re)subscription.
    FullStatus(HashMap<String, Option<SiteStatus>>),
}

/// Decode a raw text frame into a [`PushMessage`].
///
/// Returns `None` for anything that doesn't match a known shape; callers
/// drop those frames without surfacing an error.
fn decode_frame(text: &str) -> Option<PushMessage> {
    let value: Value = serde_json::from_str(text).ok()?;
    let obj = value.as_object()?;

    match obj.get("type").and_then(Value::as_str) {
        Some("scraping_status") => {
            // Both fields are required; a partial frame is inert.
            let site = obj.get("target_site")?.as_str()?;
            let status: SiteStatus = serde_json::from_value(obj.get("data")?.clone()).ok()?;
            Some(PushMessage::ScrapingStatus {
                site: site.to_lowercase(),
                status,
            })
        }
        Some("full_status") => {
            let mut sites = HashMap::new();
            for (key, val) in obj {
                if key == "type" {
                    continue;
                }
                let status = if val.is_null() {
                    None
                } else {
                    Some(serde_json::from_value(val.clone()).ok()?)
                };
                sites.insert(key.clone(), status);
            }
            Some(PushMessage::FullStatus(sites))
        }
        // Unrecognized type values are a no-op by design.
        _ => None,
    }
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

// ── PushHandle ───────────────────────────────────────────────────────

/// Handle to a running push channel.
///
/// Subscribe for decoded messages; call [`shutdown`](Self::shutdown) (or
/// cancel the token) to tear down the background task.
pub struct PushHandle {
    message_rx: broadcast::Receiver<Arc<PushMessage>>,
    cancel: CancellationToken,
}

impl PushHandle {
    /// Spawn the reconnection loop against the given WebSocket URL.
    ///
    /// Returns immediately; the first connection attempt happens
    /// asynchronously. `bearer` is attached as an `Authorization` header on
    /// the upgrade request when the HTTP session has no cookie to offer.
    pub fn connect(
        ws_url: Url,
        reconnect: ReconnectConfig,
        cancel: CancellationToken,
        bearer: Option<String>,
    ) -> Self {
        let (message_tx, message_rx) = broadcast::channel(MESSAGE_CHANNEL_CAPACITY);

        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            channel_loop(ws_url, message_tx, reconnect, task_cancel, bearer).await;
        });

        Self { message_rx, cancel }
    }

    /// Get a new broadcast receiver for the decoded message stream.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<PushMessage>> {
        self.message_rx.resubscribe()
    }

    /// Signal the background task to shut down gracefully.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

// ── Background reconnection loop ─────────────────────────────────────

/// Main loop: connect → subscribe → read → on error, backoff → reconnect.
async fn channel_loop(
    ws_url: Url,
    message_tx: broadcast::Sender<Arc<PushMessage>>,
    reconnect: ReconnectConfig,
    cancel: CancellationToken,
    bearer: Option<String>,
) {
    let mut attempt: u32 = 0;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = connect_and_read(&ws_url, &message_tx, &cancel, bearer.as_deref()) => {
                match result {
                    // Clean disconnect: reset the counter, reconnect now.
                    Ok(()) => {
                        tracing::info!("push channel disconnected cleanly, reconnecting");
                        attempt = 0;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, attempt, "push channel error");

                        if let Some(max) = reconnect.max_retries {
                            if attempt >= max {
                                tracing::error!(
                                    max_retries = max,
                                    "push channel reconnection limit reached, giving up"
                                );
                                break;
                            }
                        }

                        let delay = calculate_backoff(attempt, &reconnect);
                        tracing::debug!(
                            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                            attempt,
                            "waiting before reconnect"
                        );

                        tokio::select! {
                            biased;
                            () = cancel.cancelled() => break,
                            () = tokio::time::sleep(delay) => {}
                        }

                        attempt += 1;
                    }
                }
            }
        }
    }

    tracing::debug!("push channel loop exiting");
}

// ── Single connection lifecycle ──────────────────────────────────────

/// Establish one connection, issue the subscription request, read frames
/// until the connection drops.
async fn connect_and_read(
    url: &Url,
    message_tx: &broadcast::Sender<Arc<PushMessage>>,
    cancel: &CancellationToken,
    bearer: Option<&str>,
) -> Result<(), Error> {
    tracing::info!(url = %url, "connecting to push channel");

    let uri: tungstenite::http::Uri = url
        .as_str()
        .parse()
        .map_err(|e: tungstenite::http::uri::InvalidUri| Error::PushConnect(e.to_string()))?;

    let mut request = ClientRequestBuilder::new(uri);
    if let Some(token) = bearer {
        request = request.with_header("Authorization", format!("Bearer {token}"));
    }

    let (ws_stream, _response) = tokio_tungstenite::connect_async(request)
        .await
        .map_err(|e| Error::PushConnect(e.to_string()))?;

    let (mut write, mut read) = ws_stream.split();

    // Exactly one subscription request per activation -- never re-issued
    // per message. The server answers with a full_status resync.
    let subscribe = serde_json::json!({ "action": "subscribe", "channel": CHANNEL }).to_string();
    write
        .send(tungstenite::Message::Text(subscribe.into()))
        .await
        .map_err(|e| Error::PushConnect(e.to_string()))?;

    tracing::info!(channel = CHANNEL, "push channel subscribed");

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => return Ok(()),
            frame = read.next() => {
                match frame {
                    Some(Ok(tungstenite::Message::Text(text))) => {
                        match decode_frame(&text) {
                            Some(msg) => {
                                // Send errors just mean no subscribers yet.
                                let _ = message_tx.send(Arc::new(msg));
                            }
                            None => {
                                tracing::debug!("dropping unrecognized push frame");
                            }
                        }
                    }
                    Some(Ok(tungstenite::Message::Ping(_))) => {
                        // tungstenite answers pongs automatically
                        tracing::trace!("push channel ping");
                    }
                    Some(Ok(tungstenite::Message::Close(frame))) => {
                        if let Some(ref cf) = frame {
                            tracing::info!(
                                code = %cf.code,
                                reason = %cf.reason,
                                "push channel close frame received"
                            );
                        } else {
                            tracing::info!("push channel close frame received (no payload)");
                        }
                        return Ok(());
                    }
                    Some(Err(e)) => {
                        return Err(Error::PushConnect(e.to_string()));
                    }
                    None => {
                        // Stream ended without a close frame
                        tracing::info!("push channel stream ended");
                        return Ok(());
                    }
                    _ => {
                        // Binary, Pong, Frame -- ignore
                    }
                }
            }
        }
    }
}

// ── Backoff calculation ──────────────────────────────────────────────

/// Exponential backoff with jitter.
///
/// `delay = min(initial * 2^attempt, max) + jitter`
///
/// Jitter is +-25% to spread reconnection storms from multiple consoles.
fn calculate_backoff(attempt: u32, config: &ReconnectConfig) -> Duration {
    let base = config.initial_delay.as_secs_f64() * 2.0_f64.powi(i32::try_from(attempt).unwrap_or(i32::MAX));
    let capped = base.min(config.max_delay.as_secs_f64());

    // Deterministic "jitter" seeded from the attempt number.
    let jitter_factor = 1.0 + 0.25 * (f64::from(attempt) * 7.3).sin();
    let with_jitter = (capped * jitter_factor).max(0.0);

    Duration::from_secs_f64(with_jitter)
}

// ── Tests ────────────────────────────────────────────────────────────
