//! Logging setup.
//!
//! The terminal ui owns stdout, so while it runs logs go to a file. Without
//! a log file only the headless export logs, to stderr. `RUST_LOG` overrides
//! the default `info` level.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_error::ErrorLayer;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::domain::TVError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget<'a> {
    File(&'a Path),
    Stderr,
    Disabled,
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn init_with_writer<W>(writer: W, ansi: bool) -> Result<(), TVError>
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_writer(writer).with_ansi(ansi).with_target(false))
        .with(ErrorLayer::default())
        .try_init()
        .map_err(|e| TVError::LoggingFailed(e.to_string()))
}

/// Installs the global subscriber. Must be called at most once.
pub fn init_logging(target: LogTarget<'_>) -> Result<(), TVError> {
    match target {
        LogTarget::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            init_with_writer(Mutex::new(file), false)
        }
        LogTarget::Stderr => init_with_writer(std::io::stderr, true),
        LogTarget::Disabled => Ok(()),
    }
}
