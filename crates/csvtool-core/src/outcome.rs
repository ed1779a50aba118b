//! Successful operation results with non-fatal advisories

use crate::table::Table;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Columns contributed by one merge input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceColumns {
    /// Display label of the input (file name)
    pub source: String,
    /// Header of the input, in its own order
    pub columns: Vec<String>,
}

/// A condition worth reporting that does not fail the operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Advisory {
    /// Merge inputs had different column sets; missing values were filled
    StructuralMismatch {
        sources: Vec<SourceColumns>,
        merged: Vec<String>,
    },
    /// The operation produced no rows
    EmptyResult,
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::StructuralMismatch { sources, merged } => {
                writeln!(f, "files have different column structures:")?;
                for s in sources {
                    writeln!(f, "  {}: {}", s.source, s.columns.join(", "))?;
                }
                write!(
                    f,
                    "  merged file has all columns: {}; missing values are empty",
                    merged.join(", ")
                )
            }
            Advisory::EmptyResult => write!(f, "operation produced no rows"),
        }
    }
}

/// The value produced by an engine operation plus its advisories
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<T> {
    pub value: T,
    pub advisories: Vec<Advisory>,
}

impl<T> Outcome<T> {
    /// An outcome with no advisories
    pub fn clean(value: T) -> Self {
        Self {
            value,
            advisories: Vec::new(),
        }
    }

    /// Attach an advisory
    pub fn with_advisory(mut self, advisory: Advisory) -> Self {
        self.advisories.push(advisory);
        self
    }

    /// True if nothing was flagged
    pub fn is_clean(&self) -> bool {
        self.advisories.is_empty()
    }

    /// Check for a specific advisory
    pub fn has(&self, advisory: &Advisory) -> bool {
        self.advisories.contains(advisory)
    }

    /// Transform the value, keeping the advisories
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            value: f(self.value),
            advisories: self.advisories,
        }
    }
}

impl Outcome<Table> {
    /// Wrap a produced table, flagging [`Advisory::EmptyResult`] when it has no rows
    pub fn table(table: Table) -> Self {
        let empty = table.is_empty();
        let outcome = Self::clean(table);
        if empty {
            outcome.with_advisory(Advisory::EmptyResult)
        } else {
            outcome
        }
    }
}
