//! Core table types for representing parsed CSV data

use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A single record: column name to raw cell text, in column order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(IndexMap<String, String>);

impl Row {
    /// Create an empty row
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Get a cell by column name
    pub fn get(&self, column: &str) -> Option<&str> {
        self.0.get(column).map(String::as_str)
    }

    /// Set a cell, keeping the column's position if it already exists
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.0.insert(column.into(), value.into());
    }

    /// Check whether the row carries a column
    pub fn contains(&self, column: &str) -> bool {
        self.0.contains_key(column)
    }

    /// Column names in order
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the row has no cells
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A table of rows sharing a column set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Column names, in header order
    pub columns: Vec<String>,
    /// Row data
    pub rows: Vec<Row>,
    /// Source file path, for tables loaded from disk
    pub source_path: Option<PathBuf>,
}

impl Table {
    /// Create a new empty table with the given columns
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            source_path: None,
        }
    }

    /// Build a table from rows, taking the column order from the first row
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let columns = rows
            .first()
            .map(|r| r.columns().map(str::to_string).collect())
            .unwrap_or_default();
        Self {
            columns,
            rows,
            source_path: None,
        }
    }

    /// Attach a source path
    pub fn with_source(mut self, path: impl AsRef<Path>) -> Self {
        self.source_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// A new table with this table's columns and the given rows
    pub fn derive(&self, rows: Vec<Row>) -> Self {
        Self {
            columns: self.columns.clone(),
            rows,
            source_path: None,
        }
    }

    /// Get the number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get the number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Display label for the table's origin
    pub fn label(&self) -> String {
        self.source_path
            .as_deref()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "<memory>".to_string())
    }

    /// Require `name` to be a column of the first row.
    ///
    /// Tables with no rows pass vacuously.
    pub fn require_column(&self, name: &str) -> Result<()> {
        match self.rows.first() {
            Some(row) if !row.contains(name) => Err(Error::KeyNotFound {
                key: name.to_string(),
                available: row.columns().map(str::to_string).collect(),
            }),
            _ => Ok(()),
        }
    }
}
