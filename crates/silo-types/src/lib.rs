//! Foundation types for silo.
//!
//! This crate provides the namespace and naming types shared by the silo
//! storage crates. Every other silo crate depends on `silo-types`.
//!
//! # Key Types
//!
//! - [`BlobPath`] -- Immutable hierarchical namespace identifying where a
//!   blob lives
//! - [`names`] -- Validation for path segments and blob names, including
//!   the reserved `pending-` staging prefix and `.lock` register-lock
//!   suffix

pub mod error;
pub mod names;
pub mod path;

pub use error::NameError;
pub use names::{validate_blob_name, validate_component, validate_segment, LOCK_SUFFIX, STAGED_PREFIX};
pub use path::BlobPath;
