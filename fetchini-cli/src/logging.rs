//! `tracing-subscriber` setup.
//!
//! Library crates log through the `log` facade; the subscriber's `tracing-log`
//! bridge picks those records up.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::Local;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber.
///
/// Without `log_dir`, records go to stderr at `warn` (`debug` with
/// `--debug`). With `log_dir`, they go to a fresh timestamped file at `info`
/// (`debug` with `--debug`). `RUST_LOG` overrides either level.
///
/// Returns the log file path when one was created.
pub fn init(debug: bool, log_dir: Option<&Path>) -> Result<Option<PathBuf>> {
    let Some(dir) = log_dir else {
        let level = if debug { "debug" } else { "warn" };
        let _ = fmt()
            .with_env_filter(filter(level))
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init();
        return Ok(None);
    };

    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))?;
    let path = dir.join(log_file_name());
    let file = std::fs::File::create(&path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;

    let level = if debug { "debug" } else { "info" };
    let _ = fmt()
        .with_env_filter(filter(level))
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(Some(path))
}

fn filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

fn log_file_name() -> String {
    format!("fetchini-{}.log", Local::now().format("%Y%m%d-%H%M%S"))
}
