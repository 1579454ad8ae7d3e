//! Error types for register operations.

use silo_store::StoreError;
use thiserror::Error;

/// Errors from register operations.
#[derive(Debug, Error)]
pub enum RegisterError {
    /// The register blob holds a value of the wrong width. Fatal for this
    /// key until an operator intervenes: the value is never repaired,
    /// retried, or silently read as zero.
    #[error("corrupt register {key}: blob is {length} bytes, expected 8")]
    Corrupt { key: String, length: u64 },

    /// The per-key lock stayed contended through the whole retry budget.
    /// Transient: a later call may succeed once the holder releases.
    #[error("register lock contention on {key}: gave up after {attempts} attempts")]
    Contention { key: String, attempts: u32 },

    /// Failure from the underlying blob container, propagated unmodified.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Result alias for register operations.
pub type RegisterResult<T> = Result<T, RegisterError>;
