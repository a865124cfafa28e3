//! Common small functions used throughout the crate
//!
//! These are left public for the convenience of the user, since anyone
//! post-processing a mesh tends to need the same little checks the parser
//! does.

// standard library
use std::collections::HashSet;

// Alias for the format! macro out of laziness
pub use std::format as f;

/// Returns the first tag that appears more than once, if any
///
/// Section parsers use this to enforce tag uniqueness for volumes, physical
/// groups, nodes and elements. Scan order is input order, so the reported
/// duplicate is the first repeated value encountered.
///
/// ```rust
/// # use tetmesh::utils::first_duplicate_tag;
/// assert_eq!(first_duplicate_tag([1, 2, 3].into_iter()), None);
/// assert_eq!(first_duplicate_tag([1, 2, 1, 2].into_iter()), Some(1));
/// ```
pub fn first_duplicate_tag(tags: impl Iterator<Item = i32>) -> Option<i32> {
    let mut seen = HashSet::new();
    for tag in tags {
        if !seen.insert(tag) {
            return Some(tag);
        }
    }
    None
}
