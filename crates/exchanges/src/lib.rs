mod config;
mod feed;

pub use config::{FeedConfig, MalformedPolicy, DEFAULT_FEED_URL};
pub use feed::{decode_snapshot, FeedClient};
