//! Filesystem-backed blob containers.
//!
//! One physical file per blob, under a directory tree mirroring the
//! [`BlobPath`] segments. Writes stage to a `pending-` file in the same
//! directory and publish with a single `rename`, so readers observe either
//! the old or the new full content and a crashed writer leaves nothing
//! visible behind. Exclusive creation (`O_EXCL`) provides the atomic
//! create-if-absent marker that register locks are built on.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use silo_types::{validate_blob_name, validate_component, BlobPath, LOCK_SUFFIX};

use crate::error::{StoreError, StoreResult};
use crate::ranged::{check_range, RangedReader};
use crate::temp::{is_temp_blob_name, temp_blob_name};
use crate::traits::BlobContainer;

/// Root of a filesystem blob store. Hands out containers for namespaces
/// beneath it, creating their directories on demand.
#[derive(Clone, Debug)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Open (or create) a blob store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// The store's root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Open the container for `path`, creating nested directories on
    /// demand.
    pub fn container(&self, path: &BlobPath) -> StoreResult<FsBlobContainer> {
        let dir = self.root.join(path.relative_path());
        fs::create_dir_all(&dir)?;
        Ok(FsBlobContainer {
            path: path.clone(),
            dir,
        })
    }
}

/// A single namespace of blobs stored as files in one directory.
#[derive(Clone, Debug)]
pub struct FsBlobContainer {
    path: BlobPath,
    dir: PathBuf,
}

impl FsBlobContainer {
    /// The directory backing this container.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Stream `length` bytes into a freshly created staged file, flushed
    /// and synced so the later rename publishes durable content.
    fn stage(&self, staged_path: &Path, reader: &mut dyn Read, length: u64) -> StoreResult<()> {
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(staged_path)?;
        let mut writer = BufWriter::new(file);
        let copied = io::copy(reader, &mut writer)?;
        if copied != length {
            return Err(StoreError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("staged {copied} bytes, expected {length}"),
            )));
        }
        writer.flush()?;
        writer.get_ref().sync_all()?;
        Ok(())
    }
}

impl BlobContainer for FsBlobContainer {
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
        let staged_path = self.file_path(&temp_blob_name(name));
        let dest_path = self.file_path(name);

        if let Err(error) = self.stage(&staged_path, reader, length) {
            let _ = fs::remove_file(&staged_path);
            return Err(error);
        }

        // The existence check and the rename are two steps, so two racing
        // fail_if_exists writers can both pass the check; the register
        // layer uses try_create_exclusive where that race is unacceptable.
        if fail_if_exists && dest_path.exists() {
            let _ = fs::remove_file(&staged_path);
            return Err(StoreError::AlreadyExists {
                name: name.to_string(),
            });
        }

        if let Err(error) = fs::rename(&staged_path, &dest_path) {
            let _ = fs::remove_file(&staged_path);
            return Err(error.into());
        }

        debug!(container = %self.path, name, length, "published blob");
        Ok(())
    }

    fn read_blob(&self, name: &str) -> StoreResult<Box<dyn Read + Send>> {
        validate_component(name)?;
        match File::open(self.file_path(name)) {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(StoreError::NotFound {
                name: name.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    fn read_blob_range(
        &self,
        name: &str,
        start: u64,
        length: u64,
    ) -> StoreResult<Box<dyn Read + Send>> {
        validate_component(name)?;
        let path = self.file_path(name);
        let size = match fs::metadata(&path) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound {
                    name: name.to_string(),
                })
            }
            Err(e) => return Err(e.into()),
        };
        check_range(name, start, length, size)?;
        if length == 0 {
            return Ok(Box::new(RangedReader::<File>::empty()));
        }
        let file = match File::open(&path) {
            Ok(file) => file,
            // Deleted between the stat and the open.
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound {
                    name: name.to_string(),
                })
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Box::new(RangedReader::new(file, start, length)?))
    }

    fn blob_exists(&self, name: &str) -> StoreResult<bool> {
        validate_component(name)?;
        match fs::metadata(self.file_path(name)) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn delete_blob(&self, name: &str) -> StoreResult<()> {
        validate_component(name)?;
        match fs::remove_file(self.file_path(name)) {
            Ok(()) => {
                debug!(container = %self.path, name, "deleted blob");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn list_blobs_by_prefix(&self, prefix: &str) -> StoreResult<BTreeMap<String, u64>> {
        let mut blobs = BTreeMap::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if is_temp_blob_name(&name) || name.ends_with(LOCK_SUFFIX) {
                continue;
            }
            if !name.starts_with(prefix) {
                continue;
            }
            let size = entry.metadata()?.len();
            blobs.insert(name, size);
        }
        Ok(blobs)
    }

    fn try_create_exclusive(&self, name: &str) -> StoreResult<bool> {
        validate_component(name)?;
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.file_path(name))
        {
            Ok(_marker) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn sweep_temp_blobs(&self) -> StoreResult<usize> {
        let mut removed = 0;
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if !is_temp_blob_name(&name) {
                continue;
            }
            match fs::remove_file(entry.path()) {
                Ok(()) => removed += 1,
                // Promoted or reclaimed by someone else in the meantime.
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        if removed > 0 {
            warn!(container = %self.path, removed, "swept orphaned staged blobs");
        }
        Ok(removed)
    }
}
