//! Naming rules for staged blobs.
//!
//! A write first lands under a staged name and is only promoted to its
//! final name by an atomic rename. Staged names carry the reserved
//! `pending-` prefix so listings can exclude them and a sweep can reclaim
//! the ones left behind by interrupted writers. Pure string rules, no I/O.

use silo_types::STAGED_PREFIX;
use uuid::Uuid;

/// Build the staged name for a write targeting `name`.
///
/// The UUID suffix makes staged names collision-free across concurrent
/// writers targeting the same blob, and the reserved prefix keeps them
/// disjoint from every valid final name.
///
/// # Examples
///
/// ```
/// use silo_store::temp::{is_temp_blob_name, temp_blob_name};
///
/// let staged = temp_blob_name("meta");
/// assert!(staged.starts_with("pending-"));
/// assert!(staged.contains("meta"));
/// assert!(is_temp_blob_name(&staged));
/// ```
pub fn temp_blob_name(name: &str) -> String {
    format!("{STAGED_PREFIX}{name}-{}", Uuid::now_v7().simple())
}

/// Returns `true` iff `name` is a staged blob name.
pub fn is_temp_blob_name(name: &str) -> bool {
    name.starts_with(STAGED_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use silo_types::validate_blob_name;

    #[test]
    fn staged_name_has_prefix_and_contains_original() {
        let staged = temp_blob_name("snapshot-3");
        assert!(staged.starts_with(STAGED_PREFIX));
        assert!(staged.contains("snapshot-3"));
    }

    #[test]
    fn staged_names_are_recognized() {
        assert!(is_temp_blob_name(&temp_blob_name("x")));
        assert!(is_temp_blob_name("pending-anything"));
        assert!(!is_temp_blob_name("anything"));
        assert!(!is_temp_blob_name("pendin-g"));
    }

    #[test]
    fn staged_names_are_unique() {
        let a = temp_blob_name("same");
        let b = temp_blob_name("same");
        assert_ne!(a, b);
    }

    #[test]
    fn staged_names_never_validate_as_final_names() {
        assert!(validate_blob_name(&temp_blob_name("x")).is_err());
    }
}
