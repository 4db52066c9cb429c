//! Logging configuration for chanrank

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Registry;

use crate::Result;

const LOGS_DIR: &str = "logs";
const LOG_FILE: &str = "chanrank.log";

/// Initialize logging from the configured level
pub fn init_logging_with_config(config: &crate::config::AppConfig) -> Result<WorkerGuard> {
    init_logging_with_level(&config.logging.level)
}

/// Initialize console (stderr) and daily file logging at `level`.
///
/// `RUST_LOG` wins over `level` when set. The returned guard flushes the
/// file writer on drop and must live until the process exits.
pub fn init_logging_with_level(level: &str) -> Result<WorkerGuard> {
    let logs_dir = Path::new(LOGS_DIR);
    if !logs_dir.exists() {
        std::fs::create_dir_all(logs_dir)?;
    }

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,chanrank={level}")));

    let file_appender = tracing_appender::rolling::daily(LOGS_DIR, LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_writer(std::io::stderr);

    let file_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_writer(non_blocking)
        .with_ansi(false); // No colors in file

    // A second init (tests, embedding) keeps the first subscriber
    let _ = Registry::default()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();

    tracing::debug!("Logging initialized with level: {level}");
    tracing::debug!("Log files will be saved to: {LOGS_DIR}/{LOG_FILE}.YYYY-MM-DD");

    Ok(guard)
}

/// Initialize simple console logging for testing
pub fn init_simple_logging() {
    let _ = tracing_subscriber::fmt()
        .with_target(true)
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_logging_can_init_twice() {
        init_simple_logging();
        init_simple_logging();
        tracing::info!("still alive");
    }
}
