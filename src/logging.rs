//! Tracing initialization with console and file output.

use std::path::PathBuf;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing with console and file output.
///
/// Each run gets its own `logs-<timestamp>/` directory so a run's logs can
/// be collected and attached to a report as one unit.
pub fn init_tracing() -> anyhow::Result<()> {
    let log_dir = PathBuf::from(format!(
        "logs-{}",
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    ));
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix("takeoff")
        .filename_suffix("log")
        .build(&log_dir)?;

    // Create a non-blocking writer for file output
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // Store the guard in a static to keep it alive for the program duration
    // This is a common pattern for tracing-appender
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(_guard);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        // Console layer (human-readable text format with colors)
        .with(fmt::layer().with_target(true).with_ansi(true))
        // File layer (text format without colors)
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}
