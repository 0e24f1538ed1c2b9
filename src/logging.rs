//! Tracing setup.
//!
//! The terminal belongs to the UI, so logs go to a daily rolling file.

use color_eyre::{eyre::eyre, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

const LOG_FILE_PREFIX: &str = "wares.log";

/// Install the global subscriber. `RUST_LOG` overrides the configured level.
///
/// Returns the writer guard, which must be held until exit so buffered lines
/// are flushed. `None` means no log directory could be determined and
/// logging is off.
pub fn init(config: &Config) -> Result<Option<WorkerGuard>> {
  let Some(dir) = config.log_dir() else {
    return Ok(None);
  };

  std::fs::create_dir_all(&dir)
    .map_err(|e| eyre!("Failed to create log directory {}: {}", dir.display(), e))?;

  let filter =
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log.level));

  let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
  let (writer, guard) = tracing_appender::non_blocking(appender);

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(writer)
    .with_ansi(false)
    .with_target(true)
    .try_init()
    .map_err(|e| eyre!("Failed to initialize logging: {}", e))?;

  Ok(Some(guard))
}
