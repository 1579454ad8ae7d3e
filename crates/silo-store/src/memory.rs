//! In-memory blob container for testing and ephemeral use.
//!
//! [`InMemoryBlobContainer`] keeps all blobs in a `HashMap` behind a
//! `RwLock`. It implements the full [`BlobContainer`] trait with the same
//! observable semantics as the filesystem backend: replaces are atomic
//! (a single map insert), exclusive creation checks occupancy under the
//! write lock, and listings skip staged entries and lock markers.

use std::collections::{BTreeMap, HashMap};
use std::io::{Cursor, Read};
use std::sync::RwLock;

use silo_types::{validate_blob_name, validate_component, BlobPath, LOCK_SUFFIX};

use crate::error::{StoreError, StoreResult};
use crate::ranged::{check_range, RangedReader};
use crate::temp::is_temp_blob_name;
use crate::traits::BlobContainer;

/// An in-memory implementation of [`BlobContainer`].
///
/// All data lives in a `HashMap` behind a `RwLock` and is lost when the
/// container is dropped. Reads return owned copies, so streams stay valid
/// while later writes replace the blob.
pub struct InMemoryBlobContainer {
    path: BlobPath,
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryBlobContainer {
    /// Create an empty container serving `path`.
    pub fn new(path: BlobPath) -> Self {
        Self {
            path,
            blobs: RwLock::new(HashMap::new()),
        }
    }

    /// Number of entries currently stored, staged and markers included.
    pub fn len(&self) -> usize {
        self.blobs.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the container holds nothing at all.
    pub fn is_empty(&self) -> bool {
        self.blobs.read().expect("lock poisoned").is_empty()
    }

    /// Remove every entry.
    pub fn clear(&self) {
        self.blobs.write().expect("lock poisoned").clear();
    }
}

impl Default for InMemoryBlobContainer {
    fn default() -> Self {
        Self::new(BlobPath::root())
    }
}

impl BlobContainer for InMemoryBlobContainer {
    fn path(&self) -> &BlobPath {
        &self.path
    }

    fn write_blob_stream(
        &self,
        name: &str,
        reader: &mut dyn Read,
        length: u64,
        fail_if_exists: bool,
    ) -> StoreResult<()> {
        validate_blob_name(name)?;
        let mut data = Vec::with_capacity(length.min(1 << 20) as usize);
        reader.read_to_end(&mut data)?;
        if data.len() as u64 != length {
            return Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("staged {} bytes, expected {length}", data.len()),
            )));
        }

        let mut blobs = self.blobs.write().expect("lock poisoned");
        if fail_if_exists && blobs.contains_key(name) {
            return Err(StoreError::AlreadyExists {
                name: name.to_string(),
            });
        }
        blobs.insert(name.to_string(), data);
        Ok(())
    }

    fn read_blob(&self, name: &str) -> StoreResult<Box<dyn Read + Send>> {
        validate_component(name)?;
        let blobs = self.blobs.read().expect("lock poisoned");
        match blobs.get(name) {
            Some(data) => Ok(Box::new(Cursor::new(data.clone()))),
            None => Err(StoreError::NotFound {
                name: name.to_string(),
            }),
        }
    }

    fn read_blob_range(
        &self,
        name: &str,
        start: u64,
        length: u64,
    ) -> StoreResult<Box<dyn Read + Send>> {
        validate_component(name)?;
        let blobs = self.blobs.read().expect("lock poisoned");
        let data = blobs.get(name).ok_or_else(|| StoreError::NotFound {
            name: name.to_string(),
        })?;
        check_range(name, start, length, data.len() as u64)?;
        if length == 0 {
            return Ok(Box::new(RangedReader::<Cursor<Vec<u8>>>::empty()));
        }
        Ok(Box::new(RangedReader::new(
            Cursor::new(data.clone()),
            start,
            length,
        )?))
    }

    fn blob_exists(&self, name: &str) -> StoreResult<bool> {
        validate_component(name)?;
        Ok(self.blobs.read().expect("lock poisoned").contains_key(name))
    }

    fn delete_blob(&self, name: &str) -> StoreResult<()> {
        validate_component(name)?;
        self.blobs.write().expect("lock poisoned").remove(name);
        Ok(())
    }

    fn list_blobs_by_prefix(&self, prefix: &str) -> StoreResult<BTreeMap<String, u64>> {
        let blobs = self.blobs.read().expect("lock poisoned");
        Ok(blobs
            .iter()
            .filter(|(name, _)| {
                !is_temp_blob_name(name)
                    && !name.ends_with(LOCK_SUFFIX)
                    && name.starts_with(prefix)
            })
            .map(|(name, data)| (name.clone(), data.len() as u64))
            .collect())
    }

    fn try_create_exclusive(&self, name: &str) -> StoreResult<bool> {
        validate_component(name)?;
        let mut blobs = self.blobs.write().expect("lock poisoned");
        if blobs.contains_key(name) {
            return Ok(false);
        }
        blobs.insert(name.to_string(), Vec::new());
        Ok(true)
    }

    fn sweep_temp_blobs(&self) -> StoreResult<usize> {
        let mut blobs = self.blobs.write().expect("lock poisoned");
        let before = blobs.len();
        blobs.retain(|name, _| !is_temp_blob_name(name));
        Ok(before - blobs.len())
    }
}

impl std::fmt::Debug for InMemoryBlobContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBlobContainer")
            .field("path", &self.path)
            .field("entries", &self.len())
            .finish()
    }
}
