pub mod config;
pub mod logger;
pub mod server;

pub use config::Config;
pub use server::{router, serve, AppState};
