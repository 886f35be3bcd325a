//! Tracing subscriber setup
//!
//! The TUI owns the terminal, so everything goes to a log file.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub const DEFAULT_FILTER: &str = "typedex=info";
pub const LOG_FILE_NAME: &str = "typedex.log";

pub fn default_log_path() -> PathBuf {
    std::env::temp_dir().join(LOG_FILE_NAME)
}

/// Install the global subscriber writing to `log_file_path`.
pub fn init(log_file_path: &Path) -> io::Result<()> {
    let log_file = File::create(log_file_path)?;
    build_subscriber(log_file)
        .try_init()
        .map_err(|err| io::Error::other(format!("tracing init failed: {err}")))
}

/// `RUST_LOG` wins over [`DEFAULT_FILTER`] when set.
pub fn build_subscriber(log_file: File) -> impl tracing::Subscriber + Send + Sync {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry().with(fmt_layer).with(env_filter)
}
