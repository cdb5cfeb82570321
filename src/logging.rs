//! Tracing setup: a stdout layer filtered by RUST_LOG-style directives,
//! plus an optional daily-rolled log file when ENABLE_FILE_LOGS is set.

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE_PREFIX: &str = "hanyu-backend.log";

/// Keeps the non-blocking file writer flushing; held by `main` for the
/// lifetime of the process.
pub struct LogGuard {
    _worker: WorkerGuard,
}

pub fn init_tracing(log_level: &str) -> Option<LogGuard> {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout = fmt::layer().with_target(true);
    let registry = tracing_subscriber::registry().with(filter).with(stdout);

    match file_writer() {
        Some((writer, worker)) => {
            registry
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .init();
            Some(LogGuard { _worker: worker })
        }
        None => {
            registry.init();
            None
        }
    }
}

fn file_writer() -> Option<(NonBlocking, WorkerGuard)> {
    let enabled = std::env::var("ENABLE_FILE_LOGS")
        .map(|value| value == "true" || value == "1")
        .unwrap_or(false);
    if !enabled {
        return None;
    }

    let dir = std::env::var("LOG_DIR").unwrap_or_else(|_| "./logs".to_string());
    if let Err(err) = std::fs::create_dir_all(&dir) {
        eprintln!("failed to create log directory {dir}: {err}");
        return None;
    }

    Some(tracing_appender::non_blocking(rolling::daily(
        &dir,
        LOG_FILE_PREFIX,
    )))
}
