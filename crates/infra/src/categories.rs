//! Free-text club categories stored as a single comma separated list.

use std::collections::HashSet;

/// Split a stored category list into trimmed, non-empty items.
pub fn split(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Trim, drop empties and case-insensitive duplicates (first spelling wins),
/// keep order, and join with `", "`.
pub fn normalize(raw: &str) -> String {
    let mut seen = HashSet::new();
    split(raw)
        .into_iter()
        .filter(|item| seen.insert(item.to_lowercase()))
        .collect::<Vec<_>>()
        .join(", ")
}
