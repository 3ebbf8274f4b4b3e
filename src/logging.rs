//! Tracing setup.
//!
//! `RUST_LOG` takes precedence; otherwise the configured level applies to the
//! whole process. Output goes to stderr.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::error::{AppResult, HdaError};

/// Build the filter used by [`init`].
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

/// Install the global fmt subscriber.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init(config: &LoggingConfig) -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|err| HdaError::Logging(err.to_string()))
}
