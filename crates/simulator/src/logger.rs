use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing_appender::non_blocking;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Keeps the non-blocking writers flushing. Logging stops once this is
/// dropped, so hold it for the life of `main`.
pub struct TracingGuards {
    _stdout: WorkerGuard,
    _file: Option<WorkerGuard>,
}

/// Stdout logging filtered by `RUST_LOG` (default `info`), plus an
/// info-level daily file under `log_dir` when one is given.
pub fn init_tracing(log_dir: Option<&Path>) -> eyre::Result<TracingGuards> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (stdout_writer, stdout_guard) = non_blocking(std::io::stdout());

    let (file_layer, file_guard) = match log_dir {
        Some(dir) => {
            let (file_writer, guard) = daily_file_appender(dir, "simulator")?;
            let layer = fmt::layer()
                .with_ansi(false)
                .with_writer(file_writer)
                .with_filter(EnvFilter::new("info"));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(fmt::layer().with_writer(stdout_writer).with_ansi(true))
        .try_init()?;

    Ok(TracingGuards {
        _stdout: stdout_guard,
        _file: file_guard,
    })
}

/// `<dir>/<prefix>.YYYY-MM-DD.log`, appended to if it already exists.
fn daily_file_appender(dir: &Path, prefix: &str) -> eyre::Result<(NonBlocking, WorkerGuard)> {
    fs::create_dir_all(dir)?;
    let path = daily_file_path(dir, prefix, &Local::now().format("%Y-%m-%d").to_string());
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    Ok(non_blocking(file))
}

fn daily_file_path(dir: &Path, prefix: &str, date: &str) -> PathBuf {
    dir.join(format!("{prefix}.{date}.log"))
}
