use std::sync::Arc;

use color_eyre::eyre;
use structopt::StructOpt;
use tokio::sync::watch;
use tracing::{error, info};

use exchanges::FeedClient;
use interface::PublishedState;
use simulator::{logger, serve, AppState, Config};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // init error reporting
    color_eyre::install()?;

    dotenv::dotenv().ok();
    let config = Config::from_args();

    let _guards = logger::init_tracing(config.log_dir.as_deref())?;
    info!(?config, "trade simulator starting");

    let published = Arc::new(PublishedState::new());
    let (stop_tx, stop_rx) = watch::channel(false);

    let feed = FeedClient::new(config.feed_config(), published.clone()).spawn(stop_rx.clone());

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("shutdown requested");
                let _ = stop_tx.send(true);
            }
            Err(e) => {
                // Keep the sender alive; dropping it would stop everything.
                error!("failed to listen for ctrl-c: {}", e);
                std::future::pending::<()>().await;
            }
        }
    });

    let served = serve(
        AppState::new(published),
        config.listen_addr(),
        config.static_dir.as_deref(),
        stop_rx,
    )
    .await;

    if served.is_err() {
        feed.abort();
    }
    match feed.await {
        Err(e) if !e.is_cancelled() => error!("order book feed task failed: {}", e),
        _ => {}
    }

    info!("trade simulator stopped");
    served
}
