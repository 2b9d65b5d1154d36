use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// OKX BTC-USDT perpetual L2 book, relayed as full snapshots.
pub const DEFAULT_FEED_URL: &str =
    "wss://ws.gomarket-cpp.goquant.io/ws/l2-orderbook/okx/BTC-USDT-SWAP";

/// What to do with a frame that does not decode as an order book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedPolicy {
    /// Drop the connection and go through the normal reconnect path.
    Reconnect,
    /// Log and count the frame, keep reading on the same connection.
    Skip,
}

impl fmt::Display for MalformedPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MalformedPolicy::Reconnect => "reconnect",
            MalformedPolicy::Skip => "skip",
        };
        f.write_str(s)
    }
}

impl FromStr for MalformedPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "reconnect" => Ok(MalformedPolicy::Reconnect),
            "skip" => Ok(MalformedPolicy::Skip),
            other => Err(format!(
                "unknown malformed-message policy {:?} (expected \"reconnect\" or \"skip\")",
                other
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// WebSocket endpoint for the one venue/symbol pair.
    pub url: String,
    /// Flat wait between a failure and the next connection attempt.
    pub reconnect_delay: Duration,
    /// Deadline for the TCP connect plus WebSocket handshake.
    pub connect_timeout: Duration,
    /// Give up on a connection that has been silent this long. `None` waits
    /// forever.
    pub idle_timeout: Option<Duration>,
    pub on_malformed: MalformedPolicy,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_FEED_URL.to_string(),
            reconnect_delay: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(10),
            idle_timeout: Some(Duration::from_secs(30)),
            on_malformed: MalformedPolicy::Reconnect,
        }
    }
}
