//! Key-based row subsets: diff, intersect and duplicates
//!
//! Keys are compared after [`normalize`]; output rows keep their original
//! cell text and the source table's row order.

use crate::error::Result;
use crate::normalize::{key_set, normalize};
use crate::outcome::Outcome;
use crate::table::Table;
use std::collections::HashSet;
use tracing::debug;

/// Rows of `left` whose key does not appear in `right`
pub fn diff(left: &Table, right: &Table, key: &str) -> Result<Outcome<Table>> {
    select_by_membership(left, right, key, false)
}

/// Rows of `left` whose key appears in `right`
pub fn intersect(left: &Table, right: &Table, key: &str) -> Result<Outcome<Table>> {
    select_by_membership(left, right, key, true)
}

/// Every repeat of an already-seen key, in encounter order.
///
/// The first occurrence of a key is the original and is never reported.
pub fn duplicates(table: &Table, key: &str) -> Result<Outcome<Table>> {
    table.require_column(key)?;

    let mut seen: HashSet<String> = HashSet::new();
    let rows = table
        .rows
        .iter()
        .filter(|row| !seen.insert(normalize(row.get(key))))
        .cloned()
        .collect::<Vec<_>>();

    debug!(key, input = table.row_count(), duplicates = rows.len(), "duplicates");
    Ok(Outcome::table(table.derive(rows)))
}

fn select_by_membership(
    left: &Table,
    right: &Table,
    key: &str,
    keep_present: bool,
) -> Result<Outcome<Table>> {
    left.require_column(key)?;
    right.require_column(key)?;

    let right_keys = key_set(right, key);
    let rows = left
        .rows
        .iter()
        .filter(|row| right_keys.contains(&normalize(row.get(key))) == keep_present)
        .cloned()
        .collect::<Vec<_>>();

    debug!(
        key,
        keep_present,
        left = left.row_count(),
        right = right.row_count(),
        selected = rows.len(),
        "key membership"
    );
    Ok(Outcome::table(left.derive(rows)))
}
