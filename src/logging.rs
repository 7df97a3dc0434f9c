//! Tracing subscriber setup.
//!
//! `RUST_LOG` wins when set; otherwise the configured level applies.

use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Error, Debug)]
#[error("failed to install tracing subscriber: {0}")]
pub struct LoggingError(String);

/// Build the filter from `RUST_LOG`, falling back to `default_level`.
pub fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Install the global tracing subscriber.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(default_level: &str) -> Result<(), LoggingError> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_level))
        .with_target(false)
        .try_init()
        .map_err(|err| LoggingError(err.to_string()))
}
