use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Instant;

use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::EstimateError;
use crate::snapshot::OrderBookSnapshot;

/// A snapshot together with the moment it was published. The three fields
/// are swapped in as one unit so a reader never pairs a book with the
/// timestamp of another.
#[derive(Debug)]
pub struct Published {
    pub snapshot: OrderBookSnapshot,
    pub received_at: Instant,
    pub received_at_utc: DateTime<Utc>,
}

impl Published {
    pub fn age_secs(&self, now: Instant) -> f64 {
        now.saturating_duration_since(self.received_at).as_secs_f64()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum ConnectionState {
    Disconnected = 0,
    Connecting = 1,
    Connected = 2,
}

impl ConnectionState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => ConnectionState::Connecting,
            2 => ConnectionState::Connected,
            _ => ConnectionState::Disconnected,
        }
    }
}

/// Feed freshness as reported to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedStatus {
    pub status: &'static str,
    pub online: bool,
    pub connection: ConnectionState,
    #[serde(rename = "lastUpdate")]
    pub last_update_time: Option<DateTime<Utc>>,
    #[serde(rename = "timeSinceUpdate")]
    pub seconds_since_update: Option<f64>,
    pub has_orderbook: bool,
    pub messages_received: u64,
    pub connect_attempts: u64,
    pub decode_errors: u64,
}

/// Single-slot holder for the latest order book.
///
/// One writer (the feed loop) and any number of readers. Publishing swaps an
/// `Arc` pointer, so readers load either the whole previous snapshot or the
/// whole new one and never wait on the writer. Share it behind an `Arc`.
#[derive(Debug)]
pub struct PublishedState {
    latest: ArcSwapOption<Published>,
    connection: AtomicU8,
    messages_received: AtomicU64,
    connect_attempts: AtomicU64,
    decode_errors: AtomicU64,
}

impl Default for PublishedState {
    fn default() -> Self {
        Self::new()
    }
}

impl PublishedState {
    pub fn new() -> Self {
        Self {
            latest: ArcSwapOption::empty(),
            connection: AtomicU8::new(ConnectionState::Disconnected as u8),
            messages_received: AtomicU64::new(0),
            connect_attempts: AtomicU64::new(0),
            decode_errors: AtomicU64::new(0),
        }
    }

    /// Replaces the current snapshot wholesale and stamps it with the
    /// current time.
    pub fn publish(&self, snapshot: OrderBookSnapshot) {
        self.publish_at(snapshot, Instant::now(), Utc::now());
    }

    pub fn publish_at(
        &self,
        snapshot: OrderBookSnapshot,
        received_at: Instant,
        received_at_utc: DateTime<Utc>,
    ) {
        self.latest.store(Some(Arc::new(Published {
            snapshot,
            received_at,
            received_at_utc,
        })));
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn latest(&self) -> Option<Arc<Published>> {
        self.latest.load_full()
    }

    /// The current snapshot, or `NoSnapshotAvailable` before the first
    /// message has been published.
    pub fn snapshot(&self) -> Result<Arc<Published>, EstimateError> {
        self.latest().ok_or(EstimateError::NoSnapshotAvailable)
    }

    pub fn connection(&self) -> ConnectionState {
        ConnectionState::from_u8(self.connection.load(Ordering::Acquire))
    }

    pub fn set_connection(&self, state: ConnectionState) {
        self.connection.store(state as u8, Ordering::Release);
    }

    pub fn record_connect_attempt(&self) {
        self.connect_attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_decode_error(&self) {
        self.decode_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn messages_received(&self) -> u64 {
        self.messages_received.load(Ordering::Relaxed)
    }

    pub fn connect_attempts(&self) -> u64 {
        self.connect_attempts.load(Ordering::Relaxed)
    }

    pub fn decode_errors(&self) -> u64 {
        self.decode_errors.load(Ordering::Relaxed)
    }

    pub fn status(&self) -> FeedStatus {
        self.status_at(Instant::now())
    }

    /// The feed counts as online while it is connected and has published at
    /// least one snapshot.
    pub fn status_at(&self, now: Instant) -> FeedStatus {
        let latest = self.latest();
        let connection = self.connection();
        let online = connection == ConnectionState::Connected && latest.is_some();

        FeedStatus {
            status: if online { "online" } else { "offline" },
            online,
            connection,
            last_update_time: latest.as_ref().map(|p| p.received_at_utc),
            seconds_since_update: latest.as_ref().map(|p| p.age_secs(now)),
            has_orderbook: latest.is_some(),
            messages_received: self.messages_received(),
            connect_attempts: self.connect_attempts(),
            decode_errors: self.decode_errors(),
        }
    }
}
