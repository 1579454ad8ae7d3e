//! Error types for blob container operations.

use silo_types::NameError;
use thiserror::Error;

/// Errors from blob container operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested blob was not found.
    #[error("blob not found: {name}")]
    NotFound { name: String },

    /// A blob with this name already exists and the write asked to fail
    /// rather than replace it.
    #[error("blob already exists: {name}")]
    AlreadyExists { name: String },

    /// The requested byte range does not fit inside the blob.
    #[error("invalid range for blob {name}: offset {start} + length {length} exceeds size {size}")]
    InvalidRange {
        name: String,
        start: u64,
        length: u64,
        size: u64,
    },

    /// The blob name or path segment failed validation.
    #[error("invalid name: {0}")]
    InvalidName(#[from] NameError),

    /// I/O error from the underlying storage medium.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for container operations.
pub type StoreResult<T> = Result<T, StoreError>;
