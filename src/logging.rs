//! Logging setup for feedcast.
//!
//! Console output is always on. A configured log file gets a second,
//! uncoloured copy of every line, appended across restarts. `RUST_LOG`
//! directives refine the configured level.

use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;
use crate::Result;

/// Map a configured level name to a filter. Unknown names fall back to info.
fn level_filter(level: &str) -> LevelFilter {
    match level.trim().to_ascii_lowercase().as_str() {
        "warning" => LevelFilter::WARN,
        other => other.parse().unwrap_or(LevelFilter::INFO),
    }
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(level_filter(level).into())
        .from_env_lossy()
}

/// Open `path` for appending, creating missing parent directories.
fn open_log_file(path: &Path) -> Result<Arc<File>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::options().create(true).append(true).open(path)?;
    Ok(Arc::new(file))
}

/// Install the global subscriber described by `config`.
///
/// Fails only if the log file cannot be opened; nothing is installed in
/// that case, so the caller may fall back to [`init_console_only`].
pub fn init(config: &LoggingConfig) -> Result<()> {
    let file_layer = match config.file.as_deref() {
        Some(path) => Some(
            fmt::layer()
                .with_writer(open_log_file(Path::new(path))?)
                .with_ansi(false),
        ),
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter(&config.level))
        .with(fmt::layer().with_target(true))
        .with(file_layer)
        .init();

    Ok(())
}

/// Install a console-only subscriber at `level`.
pub fn init_console_only(level: &str) {
    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(fmt::layer().with_target(true))
        .init();
}
