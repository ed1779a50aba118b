//! Merge engine for combining tables with differing column sets

use crate::codec::read_table;
use crate::error::Result;
use crate::outcome::{Advisory, Outcome, SourceColumns};
use crate::table::{Row, Table};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use tracing::{debug, warn};

/// Load every file and merge them in order
pub fn merge_files<P: AsRef<Path>>(paths: &[P]) -> Result<Outcome<Table>> {
    let tables = paths
        .iter()
        .map(read_table)
        .collect::<Result<Vec<Table>>>()?;
    merge_tables(&tables)
}

/// Concatenate tables under the union of their columns.
///
/// Columns appear in first-seen order across the inputs; cells missing from
/// a row's source table are filled with the empty string. Tables without
/// rows contribute nothing.
pub fn merge_tables(tables: &[Table]) -> Result<Outcome<Table>> {
    let populated: Vec<&Table> = tables.iter().filter(|t| !t.is_empty()).collect();

    // Build unified column list (union of all columns)
    let mut columns: Vec<String> = Vec::new();
    let mut seen_columns: HashSet<&str> = HashSet::new();
    for table in &populated {
        for col in &table.columns {
            if seen_columns.insert(col.as_str()) {
                columns.push(col.clone());
            }
        }
    }

    let rows: Vec<Row> = populated
        .iter()
        .flat_map(|t| t.rows.iter())
        .map(|row| {
            columns
                .iter()
                .map(|col| (col.as_str(), row.get(col).unwrap_or("")))
                .collect()
        })
        .collect();

    debug!(
        inputs = tables.len(),
        populated = populated.len(),
        rows = rows.len(),
        columns = columns.len(),
        "merged tables"
    );

    let mismatch = column_mismatch(&populated, &columns);
    let mut outcome = Outcome::table(Table { columns, rows, source_path: None });
    if let Some(advisory) = mismatch {
        warn!("{advisory}");
        outcome = outcome.with_advisory(advisory);
    }
    Ok(outcome)
}

/// Report differing column sets, compared order-insensitively
fn column_mismatch(tables: &[&Table], merged: &[String]) -> Option<Advisory> {
    let (first, rest) = tables.split_first()?;
    let reference: BTreeSet<&str> = first.columns.iter().map(String::as_str).collect();
    let differs = rest
        .iter()
        .any(|t| t.columns.iter().map(String::as_str).collect::<BTreeSet<_>>() != reference);

    if !differs {
        return None;
    }

    Some(Advisory::StructuralMismatch {
        sources: tables
            .iter()
            .map(|t| SourceColumns {
                source: t.label(),
                columns: t.columns.clone(),
            })
            .collect(),
        merged: merged.to_vec(),
    })
}
