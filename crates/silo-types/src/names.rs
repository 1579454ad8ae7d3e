//! Blob and path-segment name validation.
//!
//! Valid names:
//! - Must be non-empty
//! - Must not contain path separators (`/`, `\`), NUL, or other control
//!   characters
//! - Must not be `.` or `..`
//!
//! Blob names additionally must not end with `.lock` (reserved for register
//! lock markers) and must not start with `pending-` (reserved for staged
//! writes that have not been published yet).

use crate::error::{NameError, Result};

/// Reserved prefix for staged blobs awaiting atomic publish.
pub const STAGED_PREFIX: &str = "pending-";

/// Reserved suffix for register lock markers.
pub const LOCK_SUFFIX: &str = ".lock";

/// Characters that are forbidden anywhere in a segment or blob name.
const FORBIDDEN_CHARS: &[char] = &['/', '\\', '\0', '\t', '\n', '\r'];

fn check_common(name: &str) -> std::result::Result<(), String> {
    if name.is_empty() {
        return Err("must not be empty".into());
    }
    if name == "." || name == ".." {
        return Err("must not be '.' or '..'".into());
    }
    for ch in FORBIDDEN_CHARS {
        if name.contains(*ch) {
            return Err(format!("contains forbidden character: {ch:?}"));
        }
    }
    Ok(())
}

/// Validate any single-component store name, returning `Ok(())` if valid.
///
/// This is the character-level check shared by blob names, staged names,
/// and lock markers: it rejects anything that could escape the directory
/// it is resolved against, but does not enforce the reserved prefix and
/// suffix rules. Read, delete, and lock operations use this form so that
/// staged blobs and lock markers remain addressable.
pub fn validate_component(name: &str) -> Result<()> {
    check_common(name).map_err(|reason| NameError::InvalidBlobName {
        name: name.to_string(),
        reason,
    })
}

/// Validate a single path segment, returning `Ok(())` if valid.
///
/// Segments become directory names on filesystem backends, so anything that
/// could escape the namespace or confuse a directory listing is rejected.
///
/// # Examples
///
/// ```
/// use silo_types::names::validate_segment;
///
/// assert!(validate_segment("indices").is_ok());
/// assert!(validate_segment("..").is_err());
/// assert!(validate_segment("a/b").is_err());
/// ```
pub fn validate_segment(name: &str) -> Result<()> {
    check_common(name).map_err(|reason| NameError::InvalidSegment {
        name: name.to_string(),
        reason,
    })
}

/// Validate a final blob name, returning `Ok(())` if valid.
///
/// On top of the segment rules, the `pending-` prefix and the `.lock`
/// suffix are reserved: the former names staged blobs that are invisible to
/// listings, the latter names register lock markers. Rejecting them here
/// keeps both namespaces disjoint from ordinary blobs.
pub fn validate_blob_name(name: &str) -> Result<()> {
    check_common(name).map_err(|reason| NameError::InvalidBlobName {
        name: name.to_string(),
        reason,
    })?;

    if name.starts_with(STAGED_PREFIX) {
        return Err(NameError::InvalidBlobName {
            name: name.to_string(),
            reason: format!("must not start with reserved prefix {STAGED_PREFIX:?}"),
        });
    }
    if name.ends_with(LOCK_SUFFIX) {
        return Err(NameError::InvalidBlobName {
            name: name.to_string(),
            reason: format!("must not end with reserved suffix {LOCK_SUFFIX:?}"),
        });
    }
    Ok(())
}
