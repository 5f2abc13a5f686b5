//! Error types for DeepAssign operations.

use crate::enums::ValueKind;
use thiserror::Error;

/// The main error type for DeepAssign operations.
///
/// Merging never fails on data shape; the variants here cover configuration
/// mistakes, strict-mode path failures, and the I/O performed by profile
/// loading.
#[derive(Error, Debug)]
pub enum DeepAssignError {
    /// Invalid engine or accessor configuration (e.g. an unknown array mode)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A path segment did not resolve while in strict mode
    #[error("Path not found: '{path}' (resolved up to '{resolved}')")]
    PathNotFound {
        /// The full requested path
        path: String,
        /// The deepest prefix of `path` that did resolve
        resolved: String,
    },

    /// An intermediate path segment holds a value that cannot be descended into
    #[error("Path conflict at '{path}': cannot descend into a {found} value")]
    PathConflict {
        /// The offending path prefix
        path: String,
        /// The kind of value found at `path`
        found: ValueKind,
    },

    /// Profile resolution error
    #[error("Profile error: {0}")]
    Profile(String),

    /// Schema validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// A value could not be converted to a serialized form
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl DeepAssignError {
    /// Whether this error reports a strict-mode path failure.
    ///
    /// Path failures are always recoverable: callers may treat them as absence.
    pub fn is_path_error(&self) -> bool {
        matches!(
            self,
            DeepAssignError::PathNotFound { .. } | DeepAssignError::PathConflict { .. }
        )
    }
}

/// A specialized Result type for DeepAssign operations.
pub type Result<T> = std::result::Result<T, DeepAssignError>;

/// Helper macro to bail out with a DeepAssignError
///
/// # Example
///
/// ```ignore
/// if !valid {
///     bail!(Configuration, "invalid array mode '{}'", mode);
/// }
/// ```
#[macro_export]
macro_rules! bail {
    ($variant:ident, $msg:expr) => {
        return Err($crate::DeepAssignError::$variant($msg.to_string()))
    };
    ($variant:ident, $fmt:expr, $($arg:tt)*) => {
        return Err($crate::DeepAssignError::$variant(format!($fmt, $($arg)*)))
    };
}
