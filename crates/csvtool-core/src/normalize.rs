//! Key normalization for equality comparisons

use crate::table::Table;
use std::collections::HashSet;

/// Canonical form of a cell for key and filter comparisons.
///
/// Absent input normalizes to the empty string; otherwise the value is
/// trimmed and lower-cased.
pub fn normalize<'a>(value: impl Into<Option<&'a str>>) -> String {
    value
        .into()
        .map(|v| v.trim().to_lowercase())
        .unwrap_or_default()
}

/// Normalized values of `key` across every row of `table`
pub fn key_set(table: &Table, key: &str) -> HashSet<String> {
    table.rows.iter().map(|row| normalize(row.get(key))).collect()
}
