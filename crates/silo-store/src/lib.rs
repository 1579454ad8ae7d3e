//! Durable blob containers for silo.
//!
//! This crate implements a filesystem-backed container of opaque byte
//! blobs with atomic publish semantics: every write stages its content
//! under a reserved `pending-` name and promotes it with a single atomic
//! rename, so readers always observe either the old or the new full value
//! and interrupted writers leave nothing visible behind.
//!
//! # Storage Backends
//!
//! All backends implement the [`BlobContainer`] trait:
//!
//! - [`FsBlobContainer`] -- one file per blob under a directory tree
//!   mirroring the [`BlobPath`](silo_types::BlobPath) namespace
//! - [`InMemoryBlobContainer`] -- `HashMap`-based container for tests and
//!   embedding
//!
//! # Design Rules
//!
//! 1. Publishes are stage-then-rename; a blob is never partially visible.
//! 2. Ranged reads seek, never skip: I/O is proportional to the requested
//!    range, not to its offset.
//! 3. Exclusive creation is the only medium-level mutex primitive; nothing
//!    else coordinates writers.
//! 4. Listings show published blobs only; staged entries and lock markers
//!    stay invisible.
//! 5. All medium failures are propagated, never silently ignored.

pub mod error;
pub mod fs;
pub mod memory;
pub mod ranged;
pub mod temp;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use fs::{FsBlobContainer, FsBlobStore};
pub use memory::InMemoryBlobContainer;
pub use ranged::RangedReader;
pub use temp::{is_temp_blob_name, temp_blob_name};
pub use traits::BlobContainer;
