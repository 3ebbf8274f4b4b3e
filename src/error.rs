//! Custom error types for the application.
//!
//! `HdaError` is the one error type for the library. It is built with
//! `thiserror` so that `?` works across I/O, ioctl, and configuration failures.
//!
//! ## Error Hierarchy
//!
//! - **`DeviceMismatch`** / **`UnsupportedVersion`**: the two domain failures. The
//!   device behind the hwdep node is not an HD-audio codec, or the kernel speaks
//!   an older protocol than required. Both abort the fixup before any verb is sent.
//! - **`Io`**: opening the device node failed.
//! - **`Ioctl`**: a control request was rejected by the kernel. Carries the
//!   request name so the log says which step failed.
//! - **`InvalidVerb`**: a command that cannot be packed into a verb word.
//! - **`Config`** / **`Configuration`**: load and validation failures.
//! - **`Logging`**: the tracing subscriber could not be installed.

use thiserror::Error;

use crate::hardware::ProtocolVersion;

/// Convenience alias for results using the application error type.
pub type AppResult<T> = std::result::Result<T, HdaError>;

/// Errors raised while configuring or talking to an HD-audio hwdep device.
#[derive(Error, Debug)]
pub enum HdaError {
    /// The device identity does not start with the expected family prefix.
    #[error("Device mismatch: '{name}' does not start with '{expected_prefix}'")]
    DeviceMismatch {
        /// Name reported by the device.
        name: String,
        /// Prefix that was required.
        expected_prefix: String,
    },

    /// The hwdep protocol version is older than required.
    #[error("Unsupported hwdep version {found} (minimum {minimum})")]
    UnsupportedVersion {
        /// Version reported by the kernel.
        found: ProtocolVersion,
        /// Minimum accepted version.
        minimum: ProtocolVersion,
    },

    /// I/O failure, typically opening the device node.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A control request failed.
    #[error("{request} failed: {source}")]
    Ioctl {
        /// Name of the control request.
        request: &'static str,
        /// OS error returned by the kernel.
        #[source]
        source: std::io::Error,
    },

    /// A command cannot be encoded into a verb word.
    #[error("Invalid verb: {0}")]
    InvalidVerb(String),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    /// Configuration loaded but failed validation.
    #[error("Configuration validation error: {0}")]
    Configuration(String),

    /// Tracing subscriber setup failed.
    #[error("Logging setup error: {0}")]
    Logging(String),
}

impl From<figment::Error> for HdaError {
    fn from(err: figment::Error) -> Self {
        HdaError::Config(Box::new(err))
    }
}

impl HdaError {
    /// Whether this is one of the device-validation failures that abort the
    /// fixup before any command is written.
    pub fn is_validation_failure(&self) -> bool {
        matches!(
            self,
            HdaError::DeviceMismatch { .. } | HdaError::UnsupportedVersion { .. }
        )
    }
}
