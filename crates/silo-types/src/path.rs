//! Hierarchical blob namespaces.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::names::validate_segment;

/// An immutable, ordered sequence of path segments naming a blob namespace.
///
/// The root namespace is the empty sequence. Paths are extended with
/// [`BlobPath::add`], which validates the new segment and returns a new
/// path; existing values are never mutated.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlobPath {
    segments: Vec<String>,
}

impl BlobPath {
    /// The root namespace (empty segment sequence).
    pub fn root() -> Self {
        Self::default()
    }

    /// Build a path from an iterator of segments, validating each one.
    pub fn from_segments<I, S>(segments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut path = Self::root();
        for segment in segments {
            path = path.add(segment.as_ref())?;
        }
        Ok(path)
    }

    /// Return a new path with `segment` appended.
    pub fn add(&self, segment: &str) -> Result<Self> {
        validate_segment(segment)?;
        let mut segments = self.segments.clone();
        segments.push(segment.to_string());
        Ok(Self { segments })
    }

    /// The ordered segments of this path.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Returns `true` for the root (empty) path.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The parent namespace, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Resolve this namespace as a relative filesystem path.
    ///
    /// The root resolves to the empty path. Segment validation guarantees
    /// the result never escapes the directory it is joined onto.
    pub fn relative_path(&self) -> PathBuf {
        self.segments.iter().collect()
    }
}

impl std::fmt::Display for BlobPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}
