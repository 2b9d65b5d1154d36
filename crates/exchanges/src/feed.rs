use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::StreamExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

use interface::{ConnectionState, FeedError, OrderBookSnapshot, PublishedState};

use crate::config::{FeedConfig, MalformedPolicy};

/// Interval between info-level "update received" lines; every other update
/// only goes to debug.
const SUMMARY_INTERVAL: Duration = Duration::from_secs(10);

/// Keeps the published order book fresh.
///
/// Connects to the venue, publishes every decoded snapshot into the shared
/// [`PublishedState`] and reconnects after a flat delay whenever the
/// connection fails, closes, goes quiet or (by default) delivers a malformed
/// frame. Retries never stop on their own; only the shutdown signal ends the
/// loop.
pub struct FeedClient {
    config: FeedConfig,
    state: Arc<PublishedState>,
}

impl FeedClient {
    pub fn new(config: FeedConfig, state: Arc<PublishedState>) -> Self {
        Self { config, state }
    }

    /// Runs the feed as a background task. Send `true` on the shutdown
    /// channel (or drop its sender) to stop it.
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let url = self.config.url.clone();
        info!(
            url = %url,
            reconnect_delay = ?self.config.reconnect_delay,
            on_malformed = %self.config.on_malformed,
            "order book feed starting"
        );

        loop {
            let outcome = tokio::select! {
                outcome = self.connect_and_receive() => outcome,
                _ = shutdown_requested(&mut shutdown) => break,
            };
            self.state.set_connection(ConnectionState::Disconnected);

            match outcome {
                Ok(()) => {
                    warn!(url = %url, "order book feed closed, reconnecting...");
                }
                Err(e) if e.is_decode() => {
                    error!(url = %url, error = %e, "malformed order book message, reconnecting...");
                }
                Err(e) => {
                    error!(url = %url, error = %e, "order book feed error, reconnecting...");
                }
            }

            tokio::select! {
                _ = sleep(self.config.reconnect_delay) => {}
                _ = shutdown_requested(&mut shutdown) => break,
            }
        }

        self.state.set_connection(ConnectionState::Disconnected);
        info!(url = %url, "order book feed stopped");
    }

    /// One connection's lifetime. `Ok` means the remote ended the stream
    /// cleanly; every other way out is an error.
    async fn connect_and_receive(&self) -> Result<(), FeedError> {
        let url = self.config.url.as_str();

        self.state.set_connection(ConnectionState::Connecting);
        self.state.record_connect_attempt();
        info!(url, "connecting to order book feed");

        let connect_timeout = self.config.connect_timeout;
        let (mut ws_stream, _) = timeout(connect_timeout, connect_async(url))
            .await
            .map_err(|_| FeedError::ConnectTimeout {
                endpoint: url.to_string(),
                after: connect_timeout,
            })?
            .map_err(|e| FeedError::transport(url, e))?;

        self.state.set_connection(ConnectionState::Connected);
        info!(url, "order book feed connected");

        let mut summary = SummaryLog::new(SUMMARY_INTERVAL);

        loop {
            let next = match self.config.idle_timeout {
                Some(after) => timeout(after, ws_stream.next())
                    .await
                    .map_err(|_| FeedError::Timeout {
                        endpoint: url.to_string(),
                        after,
                    })?,
                None => ws_stream.next().await,
            };

            let msg = match next {
                Some(msg) => msg.map_err(|e| FeedError::transport(url, e))?,
                None => return Ok(()),
            };

            let handled = match msg {
                Message::Text(text) => self.handle_ws_message(&text, &mut summary),
                Message::Binary(bytes) => match std::str::from_utf8(&bytes) {
                    Ok(text) => self.handle_ws_message(text, &mut summary),
                    Err(e) => Err(FeedError::decode(e, &String::from_utf8_lossy(&bytes))),
                },
                Message::Close(frame) => {
                    warn!(url, ?frame, "order book feed closed by remote");
                    return Ok(());
                }
                // tungstenite answers pings itself.
                _ => continue,
            };

            if let Err(e) = handled {
                self.state.record_decode_error();
                match self.config.on_malformed {
                    MalformedPolicy::Reconnect => return Err(e),
                    MalformedPolicy::Skip => {
                        warn!(url, error = %e, "skipping malformed order book message");
                    }
                }
            }
        }
    }

    fn handle_ws_message(&self, text: &str, summary: &mut SummaryLog) -> Result<(), FeedError> {
        let snapshot = decode_snapshot(text)?;

        if summary.due(Instant::now()) {
            info!(
                symbol = %snapshot.symbol,
                asks = snapshot.asks.len(),
                bids = snapshot.bids.len(),
                "received order book update"
            );
        } else {
            debug!(
                symbol = %snapshot.symbol,
                asks = snapshot.asks.len(),
                bids = snapshot.bids.len(),
                "received order book update"
            );
        }

        self.state.publish(snapshot);
        Ok(())
    }
}

pub fn decode_snapshot(text: &str) -> Result<OrderBookSnapshot, FeedError> {
    OrderBookSnapshot::from_json(text).map_err(|e| FeedError::decode(e, text))
}

/// Resolves once a stop has been requested. A dropped sender leaves nobody
/// able to stop the feed later, so it counts as a stop too.
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}

struct SummaryLog {
    every: Duration,
    last: Option<Instant>,
}

impl SummaryLog {
    fn new(every: Duration) -> Self {
        Self { every, last: None }
    }

    fn due(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.saturating_duration_since(last) < self.every => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_snapshot_maps_to_decode_error() {
        let err = decode_snapshot(r#"{"symbol":"X","bids":[["x","1"]],"asks":[]}"#).unwrap_err();
        assert!(err.is_decode());

        let err = decode_snapshot(r#"{"symbol":"X","bids":[["1","-2"]],"asks":[]}"#).unwrap_err();
        assert!(err.is_decode());

        let ok = decode_snapshot(r#"{"symbol":"X","bids":[["1","2"]],"asks":[]}"#).unwrap();
        assert_eq!(ok.best_bid(), Some(1.0));
    }

    #[test]
    fn test_summary_log_throttles() {
        let t0 = Instant::now();
        let mut summary = SummaryLog::new(Duration::from_secs(10));
        assert!(summary.due(t0));
        assert!(!summary.due(t0 + Duration::from_secs(3)));
        assert!(!summary.due(t0 + Duration::from_millis(9_999)));
        assert!(summary.due(t0 + Duration::from_secs(10)));
        assert!(!summary.due(t0 + Duration::from_secs(11)));
    }

    #[tokio::test]
    async fn test_stops_on_shutdown_while_backing_off() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let state = Arc::new(PublishedState::new());
        let config = FeedConfig {
            url: format!("ws://{}", addr),
            reconnect_delay: Duration::from_secs(3600),
            ..FeedConfig::default()
        };
        let (stop_tx, stop_rx) = watch::channel(false);
        let handle = FeedClient::new(config, state.clone()).spawn(stop_rx);

        while state.connect_attempts() == 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        stop_tx.send(true).unwrap();

        timeout(Duration::from_secs(5), handle)
            .await
            .expect("feed loop did not stop")
            .unwrap();
        assert_eq!(state.connection(), ConnectionState::Disconnected);
        assert!(state.latest().is_none());
    }
}
