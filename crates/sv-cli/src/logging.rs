//! Logging setup with optional file rotation.

use std::path::{Path, PathBuf};

use sv_config::LoggingConfig;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, fmt, prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt,
};

const LOG_FILE_PREFIX: &str = "sv";
const LOG_FILE_SUFFIX: &str = "log";
const MAX_LOG_FILES: usize = 7;

/// Setup logging with console and optional rotating file output.
///
/// # Log Layers
/// - Console: human-readable on stderr, so stdout stays free for events
/// - File: plain text, daily rotation, 7-day retention (when `logging.file`)
///
/// `RUST_LOG` takes precedence over the configured level. Records emitted
/// through the `log` facade are captured as well.
pub fn setup_logging(
    config: &LoggingConfig,
    config_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let console_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_ansi(config.colored)
        .with_writer(std::io::stderr);

    let file_layer = if config.file {
        let logs_dir = config_dir.join(&config.dir);
        std::fs::create_dir_all(&logs_dir)?;

        let file_appender = file_appender(&logs_dir)?;

        Some(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_ansi(false)
                .with_writer(file_appender),
        )
    } else {
        None
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_directive()));

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    Ok(())
}

pub(crate) fn file_appender(
    logs_dir: &Path,
) -> Result<RollingFileAppender, tracing_appender::rolling::InitError> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .max_log_files(MAX_LOG_FILES)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix(LOG_FILE_SUFFIX)
        .build(logs_dir)
}

/// Path of today's log file, if file logging is enabled.
///
/// The appender rolls over at UTC midnight, so the date is the UTC one.
pub fn current_log_path(config: &LoggingConfig, config_dir: &Path) -> Option<PathBuf> {
    if !config.file {
        return None;
    }

    let today = chrono::Utc::now().format("%Y-%m-%d");
    Some(
        config_dir
            .join(&config.dir)
            .join(format!("{LOG_FILE_PREFIX}.{today}.{LOG_FILE_SUFFIX}")),
    )
}
