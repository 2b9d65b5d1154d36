use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use structopt::StructOpt;

use exchanges::{FeedConfig, MalformedPolicy};

/// Every flag can also come from the environment (or a `.env` file).
#[derive(Debug, StructOpt)]
#[structopt(
    name = "trade-simulator",
    about = "Live order book feed with execution cost estimates"
)]
pub struct Config {
    /// Order book WebSocket endpoint
    #[structopt(
        long,
        env = "FEED_URL",
        default_value = "wss://ws.gomarket-cpp.goquant.io/ws/l2-orderbook/okx/BTC-USDT-SWAP"
    )]
    pub feed_url: String,

    /// Seconds to wait before reconnecting after a feed failure
    #[structopt(long, env = "RECONNECT_DELAY_SECS", default_value = "5")]
    pub reconnect_delay_secs: u64,

    /// Give up on a connection attempt whose handshake takes longer than this
    #[structopt(long, env = "CONNECT_TIMEOUT_SECS", default_value = "10")]
    pub connect_timeout_secs: u64,

    /// Drop a feed connection that has been silent this many seconds (0 disables)
    #[structopt(long, env = "IDLE_TIMEOUT_SECS", default_value = "30")]
    pub idle_timeout_secs: u64,

    /// What to do with an undecodable feed message: "reconnect" or "skip"
    #[structopt(long, env = "ON_MALFORMED", default_value = "reconnect")]
    pub on_malformed: MalformedPolicy,

    #[structopt(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    #[structopt(long, env = "PORT", default_value = "5000")]
    pub port: u16,

    /// Built front end to serve on every non-API path
    #[structopt(long, env = "STATIC_DIR", parse(from_os_str))]
    pub static_dir: Option<PathBuf>,

    /// Also write daily log files into this directory
    #[structopt(long, env = "LOG_DIR", parse(from_os_str))]
    pub log_dir: Option<PathBuf>,
}

impl Config {
    pub fn feed_config(&self) -> FeedConfig {
        FeedConfig {
            url: self.feed_url.clone(),
            reconnect_delay: Duration::from_secs(self.reconnect_delay_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            idle_timeout: match self.idle_timeout_secs {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
            on_malformed: self.on_malformed,
        }
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
