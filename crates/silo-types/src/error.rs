//! Error types for path and name validation.

use thiserror::Error;

/// Errors that can occur while validating blob paths and names.
#[derive(Debug, Error)]
pub enum NameError {
    /// A path segment failed validation.
    #[error("invalid path segment: {name}: {reason}")]
    InvalidSegment { name: String, reason: String },

    /// A blob name failed validation.
    #[error("invalid blob name: {name}: {reason}")]
    InvalidBlobName { name: String, reason: String },
}

/// Convenience type alias for validation results.
pub type Result<T> = std::result::Result<T, NameError>;
