// src/error.rs

//! Unified error handling for the site publishing pipeline.

use std::fmt;

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// The archive holds no HTML document to publish
    #[error("No HTML file found in the ZIP.")]
    NoAnchorDocument,

    /// A single asset could not be relocated
    #[error("Error processing asset {path}: {message}")]
    AssetProcessing { path: String, message: String },

    /// Object storage rejected or failed a request
    #[error("Storage error for '{key}': {message}")]
    Storage { key: String, message: String },

    /// An archive entry name could not be decoded
    #[error("Malformed entry name '{name}': {message}")]
    MalformedEntry { name: String, message: String },

    /// The input is not a readable ZIP archive
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// A rewrite pattern could not be compiled
    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// The job did not finish in time
    #[error("Job timed out after {0}s")]
    Timeout(u64),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create an asset processing error.
    pub fn asset(path: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::AssetProcessing {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Create a storage error for the given object key.
    pub fn storage(key: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Storage {
            key: key.into(),
            message: message.to_string(),
        }
    }

    /// Create a malformed entry error.
    pub fn malformed(name: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::MalformedEntry {
            name: name.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether this error terminates the whole job.
    ///
    /// Entry and asset errors only degrade the result.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::AssetProcessing { .. } | Self::MalformedEntry { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soft_errors_are_not_fatal() {
        assert!(!AppError::asset("img/a.png", "boom").is_fatal());
        assert!(!AppError::malformed("%zz", "bad escape").is_fatal());
        assert!(AppError::NoAnchorDocument.is_fatal());
        assert!(AppError::storage("job/index.html", "denied").is_fatal());
    }

    #[test]
    fn test_display_includes_context() {
        let err = AppError::storage("job/a.css", "timeout");
        assert_eq!(err.to_string(), "Storage error for 'job/a.css': timeout");
    }
}
