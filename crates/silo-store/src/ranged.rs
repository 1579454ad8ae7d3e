//! Exact byte-range reads over seekable handles.
//!
//! [`RangedReader`] serves a `[start, start + length)` window of a blob
//! with a hard I/O-proportionality contract: the handle is positioned at
//! `start` with a single seek, never by consuming and discarding the
//! prefix, so a fully drained reader has read exactly `length` bytes from
//! the medium and an unread one has read zero. Zero-length ranges never
//! touch the medium at all.

use std::io::{self, Read, Seek, SeekFrom, Take};

use crate::error::{StoreError, StoreResult};

/// Validate that `[start, start + length)` fits inside a blob of `size`
/// bytes, overflow-checked.
pub fn check_range(name: &str, start: u64, length: u64, size: u64) -> StoreResult<()> {
    let out_of_range = || StoreError::InvalidRange {
        name: name.to_string(),
        start,
        length,
        size,
    };
    let end = start.checked_add(length).ok_or_else(out_of_range)?;
    if end > size {
        return Err(out_of_range());
    }
    Ok(())
}

/// A reader yielding exactly `length` bytes of a seekable handle starting
/// at a fixed offset.
///
/// Callers validate the range first (see [`check_range`]); construction
/// then performs the one seek. The handle is owned and is closed when the
/// reader is dropped, on every path including early drop mid-read.
#[derive(Debug)]
pub struct RangedReader<R> {
    inner: Option<Take<R>>,
}

impl<R: Read + Seek> RangedReader<R> {
    /// Seek `handle` to `start` and limit it to `length` bytes.
    pub fn new(mut handle: R, start: u64, length: u64) -> StoreResult<Self> {
        if length == 0 {
            return Ok(Self::empty());
        }
        handle.seek(SeekFrom::Start(start))?;
        Ok(Self {
            inner: Some(handle.take(length)),
        })
    }
}

impl<R> RangedReader<R> {
    /// An immediately-exhausted reader holding no handle.
    ///
    /// Used for zero-length ranges so the medium is never opened or read.
    pub fn empty() -> Self {
        Self { inner: None }
    }
}

impl<R: Read> Read for RangedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.inner.as_mut() {
            Some(limited) => limited.read(buf),
            None => Ok(0),
        }
    }
}
