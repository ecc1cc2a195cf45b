//! Error types shared across stfilter crates.

use std::path::PathBuf;

/// Top-level error type for stfilter operations.
#[derive(Debug, thiserror::Error)]
pub enum StfilterError {
    /// The input could not be opened or decoded.
    #[error("Source error: {message}")]
    Source { message: String },

    /// Shape or precondition violation detected before an operation ran.
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// The output could not be encoded or written.
    #[error("Sink error: {message}")]
    Sink { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using StfilterError.
pub type StfilterResult<T> = Result<T, StfilterError>;

impl StfilterError {
    pub fn source(msg: impl Into<String>) -> Self {
        Self::Source {
            message: msg.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    pub fn sink(msg: impl Into<String>) -> Self {
        Self::Sink {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported {
            message: msg.into(),
        }
    }

    /// Whether this error was raised by a precondition check.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}
