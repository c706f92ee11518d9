//! Error types for the silt core library
//!
//! Provides error handling for changelog loading, grouping,
//! output generation, and locking.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for silt operations
pub type SiltResult<T> = Result<T, SiltError>;

/// Error types for changelog processing and SQL output generation
#[derive(Debug, Error)]
pub enum SiltError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to load changelog '{path}': {message}")]
    ChangelogParse { path: String, message: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Changeset '{id}' has a malformed source location '{path}': expected a non-empty path containing '/'")]
    MalformedSourceLocation { id: String, path: String },

    #[error("Failed to create output resource '{}': {source}", path.display())]
    OutputResource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not acquire changelog lock: {0}")]
    LockAcquisition(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Migration execution error: {0}")]
    Execution(String),
}
