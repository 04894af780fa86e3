//! Logging setup.
//!
//! Filtering is controlled by the COURIER_LOG env var (tracing `EnvFilter`
//! syntax). Diagnostics go to stderr; a daily-rolling copy lands in
//! `<home>/logs/` so failed sends can be diagnosed after the fact.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::paths;

/// Env var holding the log filter directive.
pub const LOG_ENV: &str = "COURIER_LOG";

/// Initializes the global subscriber.
///
/// The returned guard must be held for the lifetime of the process; dropping
/// it flushes and stops the file writer.
pub fn init() -> WorkerGuard {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    let file_appender = tracing_appender::rolling::daily(paths::logs_dir(), "courier.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .init();

    guard
}
