//! Operation logging helpers and backend setup
//!
//! Library code logs through the `log` facade. [`init`] picks the backend for
//! the command line tool: `env_logger` by default, or a [`Log`] context with
//! rotating files when the configuration names a log file.

use std::path::Path;
use std::time::Duration;

use super::handlers::{Level, Log};
use crate::config::LogConfig;
use crate::error::Result;

/// Log the start of an operation on a file or directory
///
/// # Arguments
/// * `operation` - Description of the operation
/// * `path` - Path of the file or directory being operated on
pub fn log_operation_start(operation: &str, path: &Path) {
    log::info!("{} {}", operation, path.display());
}

/// Log the completion of an operation
///
/// # Arguments
/// * `operation` - Past-tense description of the operation
/// * `path` - Path of the file or directory that was operated on
/// * `rows` - Number of rows or files handled
/// * `elapsed` - Optional elapsed time
pub fn log_operation_complete(operation: &str, path: &Path, rows: usize, elapsed: Option<Duration>) {
    match elapsed {
        Some(duration) => log::info!(
            "{} {} rows ({}) in {:?}",
            operation,
            rows,
            path.display(),
            duration
        ),
        None => log::info!("{} {} rows ({})", operation, rows, path.display()),
    }
}

/// Log a warning, optionally tied to a path
///
/// # Arguments
/// * `message` - Warning message
/// * `path` - Optional path related to the warning
pub fn log_warning(message: &str, path: Option<&Path>) {
    if let Some(path) = path {
        log::warn!("{}: {}", message, path.display());
    } else {
        log::warn!("{message}");
    }
}

/// Install the global logging backend described by `config`
///
/// Without a log file `env_logger` is used, honouring `RUST_LOG` and falling
/// back to the configured level. With one, a [`Log`] context is built with a
/// console handler plus the requested file handlers and returned.
///
/// # Errors
/// Returns an IO error if a log file cannot be opened
pub fn init(name: &str, config: &LogConfig) -> Result<Option<Log>> {
    if config.file.is_none() && config.timed_file.is_none() {
        let default = level_name(config.level);
        // a logger may already be installed, e.g. by a test harness
        let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
            .try_init();
        return Ok(None);
    }

    let default_path = config
        .file
        .clone()
        .or_else(|| config.timed_file.clone())
        .unwrap_or_default();
    let context = Log::new(name, default_path);
    context.set_level(config.level);
    context.add_console(config.level);
    if let Some(file) = &config.file {
        context.add_rotating_file(file, config.max_bytes, config.backup_count, config.level)?;
    }
    if let Some(file) = &config.timed_file {
        context.add_timed_rotating_file(file, config.when, 1, config.backup_count, config.level)?;
    }
    if context.install().is_err() {
        log::debug!("A global logger is already installed, keeping it");
    }
    Ok(Some(context))
}

const fn level_name(level: Level) -> &'static str {
    match level {
        Level::Debug => "debug",
        Level::Info => "info",
        Level::Warning => "warn",
        Level::Error | Level::Critical => "error",
    }
}
