//! The [`BlobContainer`] trait defining the blob storage interface.
//!
//! Any backend (filesystem, in-memory) implements this trait to provide a
//! durable namespace of named byte blobs with atomic publish semantics.

use std::collections::BTreeMap;
use std::io::{Cursor, Read};

use silo_types::BlobPath;

use crate::error::StoreResult;

/// A namespace of named byte blobs.
///
/// All implementations must satisfy these invariants:
/// - A blob is always either its old full content or its new full content
///   to readers, never a mix: writes stage under a temp name and publish
///   with a single atomic replace.
/// - A failed write leaves no partially-visible blob behind.
/// - Listings cover published blobs only; staged (`pending-`) entries and
///   lock markers are excluded.
/// - Deleting a missing blob is a no-op, not an error.
/// - All medium failures are propagated, never silently ignored.
///
/// All operations are synchronous and safe to call from multiple threads;
/// coordination between independent writers relies solely on the backing
/// medium's primitives (atomic replace, exclusive create).
pub trait BlobContainer: Send + Sync {
    /// The namespace this container serves.
    fn path(&self) -> &BlobPath;

    /// Write a blob by streaming `length` bytes from `reader`.
    ///
    /// Content is staged under a temp name and atomically renamed into
    /// place. With `fail_if_exists`, an existing destination fails the
    /// write with [`StoreError::AlreadyExists`](crate::StoreError) without
    /// touching it; otherwise the previous content is replaced atomically.
    /// A stream yielding a byte count other than `length` fails the write
    /// before anything is published.
    fn write_blob_stream(
        &self,
        name: &str,
        reader: &mut dyn Read,
        length: u64,
        fail_if_exists: bool,
    ) -> StoreResult<()>;

    /// Write a blob from a byte slice.
    fn write_blob(&self, name: &str, data: &[u8], fail_if_exists: bool) -> StoreResult<()> {
        let mut reader = Cursor::new(data);
        self.write_blob_stream(name, &mut reader, data.len() as u64, fail_if_exists)
    }

    /// Open the full content of a blob as a byte stream.
    ///
    /// Fails with [`StoreError::NotFound`](crate::StoreError) if absent.
    fn read_blob(&self, name: &str) -> StoreResult<Box<dyn Read + Send>>;

    /// Open exactly `length` bytes of a blob starting at offset `start`.
    ///
    /// The returned stream consumes exactly `length` bytes from the medium
    /// when fully drained, and zero bytes before the first read: the
    /// implementation must position itself at `start` with a true seek,
    /// never by consuming and discarding the prefix. `length == 0` yields
    /// an immediately-exhausted stream without touching the medium. A
    /// range extending past the blob's size fails with
    /// [`StoreError::InvalidRange`](crate::StoreError). Dropping the
    /// stream releases the underlying handle, including mid-read.
    fn read_blob_range(
        &self,
        name: &str,
        start: u64,
        length: u64,
    ) -> StoreResult<Box<dyn Read + Send>>;

    /// Check whether a blob exists.
    fn blob_exists(&self, name: &str) -> StoreResult<bool>;

    /// Delete a blob. Absence is a no-op.
    fn delete_blob(&self, name: &str) -> StoreResult<()>;

    /// List published blobs whose name starts with `prefix`, mapping name
    /// to size in bytes. Pass `""` to list everything.
    fn list_blobs_by_prefix(&self, prefix: &str) -> StoreResult<BTreeMap<String, u64>>;

    /// List all published blobs, mapping name to size in bytes.
    fn list_blobs(&self) -> StoreResult<BTreeMap<String, u64>> {
        self.list_blobs_by_prefix("")
    }

    /// Atomically create an empty marker blob iff `name` is absent.
    ///
    /// Returns `true` if this call created the marker, `false` if it
    /// already existed. This is the mutual-exclusion primitive register
    /// locks are built on, so reserved names (`.lock`) are accepted here.
    fn try_create_exclusive(&self, name: &str) -> StoreResult<bool>;

    /// Delete orphaned staged blobs left behind by interrupted writers.
    ///
    /// Returns the number of entries removed. Only safe to run when no
    /// writer is concurrently staging into this container.
    fn sweep_temp_blobs(&self) -> StoreResult<usize>;
}
