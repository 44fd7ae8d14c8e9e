//! Error types for the conversion core.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for backup conversion operations.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Source or target database errors.
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: Option<rusqlite::Error>,
    },

    /// Scratch-file and other filesystem errors.
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Input bytes are neither a SQLite image nor CSV text.
    #[error("Unsupported input format: {message}")]
    UnsupportedFormat { message: String },
}

/// Result type alias for conversion operations.
pub type Result<T> = std::result::Result<T, ConvertError>;

impl From<std::io::Error> for ConvertError {
    fn from(err: std::io::Error) -> Self {
        ConvertError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<rusqlite::Error> for ConvertError {
    fn from(err: rusqlite::Error) -> Self {
        ConvertError::Database {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl ConvertError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        ConvertError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Create a database error with a message and no underlying cause.
    pub fn database(message: impl Into<String>) -> Self {
        ConvertError::Database {
            message: message.into(),
            source: None,
        }
    }
}
