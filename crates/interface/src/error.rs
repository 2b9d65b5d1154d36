use std::time::Duration;

use thiserror::Error;

/// Failures on the feed side. None of these reach callers of the query
/// surface: the feed loop logs them and reconnects.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("transport error on {endpoint}: {detail}")]
    Transport { endpoint: String, detail: String },

    #[error("handshake with {endpoint} did not complete within {after:?}")]
    ConnectTimeout { endpoint: String, after: Duration },

    #[error("no message from {endpoint} within {after:?}")]
    Timeout { endpoint: String, after: Duration },

    #[error("malformed order book message: {detail} (payload: {payload})")]
    Decode { detail: String, payload: String },
}

impl FeedError {
    pub fn transport(endpoint: &str, detail: impl ToString) -> Self {
        FeedError::Transport {
            endpoint: endpoint.to_string(),
            detail: detail.to_string(),
        }
    }

    /// Keeps only the head of the offending payload so a huge frame does not
    /// flood the log.
    pub fn decode(detail: impl ToString, payload: &str) -> Self {
        FeedError::Decode {
            detail: detail.to_string(),
            payload: payload.chars().take(200).collect(),
        }
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, FeedError::Decode { .. })
    }
}

/// Errors surfaced to whoever asks for a snapshot or an estimate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EstimateError {
    #[error("No orderbook data available")]
    NoSnapshotAvailable,

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

impl EstimateError {
    pub(crate) fn invalid(name: &'static str, reason: impl ToString) -> Self {
        EstimateError::InvalidParameter {
            name,
            reason: reason.to_string(),
        }
    }
}
