//! Error types for fusednorm

use thiserror::Error;

/// Result type alias using fusednorm's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by the safe entry points before a kernel is launched.
///
/// The kernel itself has no failure modes: every shape it can receive has been
/// validated here, and numerical edge cases are absorbed by formula choice.
#[derive(Error, Debug)]
pub enum Error {
    /// Buffer length does not match the declared shape
    #[error("Shape mismatch for '{arg}': expected {expected} elements, got {got}")]
    ShapeMismatch {
        /// The offending buffer
        arg: &'static str,
        /// Expected number of elements
        expected: usize,
        /// Actual number of elements
        got: usize,
    },

    /// Invalid argument provided to an operation
    #[error("Invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// The argument name
        arg: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// Launch configuration cannot be executed by the target device
    #[error("Invalid launch configuration: {reason}")]
    InvalidLaunch {
        /// Description of the violated constraint
        reason: String,
    },

    /// Backend-specific error
    #[error("Backend error: {0}")]
    Backend(String),
}

impl Error {
    /// Create a shape mismatch error
    pub fn shape_mismatch(arg: &'static str, expected: usize, got: usize) -> Self {
        Self::ShapeMismatch { arg, expected, got }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(arg: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            arg,
            reason: reason.into(),
        }
    }

    /// Create an invalid launch error
    pub fn invalid_launch(reason: impl Into<String>) -> Self {
        Self::InvalidLaunch {
            reason: reason.into(),
        }
    }
}
