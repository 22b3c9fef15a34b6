//! Unified error types for the student API.

use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for process-level failures.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration rejected by validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Student store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the JSON file store.
///
/// Unparseable file contents are not an error: the store quarantines the
/// file and reports an empty collection instead.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Filesystem operation failed.
    #[error("io error on {}: {source}", path.display())]
    Io {
        /// Path the operation was performed on.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// File holds valid JSON whose top level is not an array.
    #[error("{} does not hold a JSON array", path.display())]
    NotACollection {
        /// Path of the offending file.
        path: PathBuf,
    },

    /// Collection could not be serialized.
    #[error("failed to serialize students: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

/// A client-input rule violation. The display text is returned to the caller.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// `name` missing or blank.
    #[error("Name is required and cannot be blank.")]
    NameRequired,

    /// `course` missing or blank.
    #[error("Course is required and cannot be blank.")]
    CourseRequired,

    /// `year` missing or blank.
    #[error("Year is required and cannot be blank.")]
    YearRequired,

    /// `age` missing, not numeric or not positive.
    #[error("Age is required and must be a number greater than 0.")]
    AgeInvalid,
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, AppError>;
