use crate::config;
use anyhow::{Context, Result};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging to both console and file
/// Log files land in `log_dir` with daily rotation
pub fn init_logging(log_dir: &str) -> Result<()> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir))?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, config::LOG_FILE_NAME);

    tracing_subscriber::registry()
        .with(
            // Console output
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true)
                .with_ansi(true),
        )
        .with(
            // File output with JSON formatting
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true)
                .with_ansi(false)
                .json(),
        )
        // RUST_LOG wins, info otherwise
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init()
        .context("Global tracing subscriber already set")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::{info, warn};

    #[test]
    fn test_logging_creates_log_dir() {
        let dir = std::env::temp_dir().join(format!("income-analyzer-logs-{}", std::process::id()));
        let dir_str = dir.to_string_lossy().to_string();

        // A second init in the same process is an error, not a panic
        let first = init_logging(&dir_str);
        let second = init_logging(&dir_str);
        assert!(first.is_ok() || second.is_err());

        info!("logging initialised");
        warn!("warning line");

        assert!(dir.exists());
    }
}
