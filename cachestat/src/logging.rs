//! Logger setup
//!
//! `env_logger` backend with the level taken from `--log-level`. `RUST_LOG`,
//! when set, is applied on top for per-module filtering.

use anyhow::{Context, Result};
use env_logger::{Builder, Target, WriteStyle};
use log::LevelFilter;
use std::fs::OpenOptions;
use std::path::Path;

/// Install the global logger
///
/// With `log_file` set, records are appended to that file (kept open across
/// daemonization); otherwise they go to stderr.
///
/// # Errors
/// Returns an error if the log file cannot be opened or a logger is already installed
pub fn init_logging(level: LevelFilter, log_file: Option<&Path>) -> Result<()> {
    let mut builder = Builder::new();
    builder.filter_level(level).parse_default_env();

    if let Some(path) = log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        builder.target(Target::Pipe(Box::new(file))).write_style(WriteStyle::Never);
    }

    builder.try_init().context("Failed to initialize logger")?;
    Ok(())
}
