//! Operation requests, built from flags or from the interactive session

use csvtool_core::{FilterSpec, SortSpec, SplitSpec};
use std::path::PathBuf;

/// Default base name for split outputs (`<pattern>_<n>.csv`)
pub const DEFAULT_SPLIT_PATTERN: &str = "split_part";

/// The operations offered by the tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Merge,
    Diff,
    Intersect,
    Duplicates,
    Split,
    Filter,
    Sort,
}

impl Operation {
    pub const ALL: [Operation; 7] = [
        Operation::Merge,
        Operation::Diff,
        Operation::Intersect,
        Operation::Duplicates,
        Operation::Split,
        Operation::Filter,
        Operation::Sort,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Operation::Merge => "merge",
            Operation::Diff => "diff",
            Operation::Intersect => "intersect",
            Operation::Duplicates => "duplicates",
            Operation::Split => "split",
            Operation::Filter => "filter",
            Operation::Sort => "sort",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Operation::Merge => "merge multiple CSV files",
            Operation::Diff => "rows from csv1 not in csv2",
            Operation::Intersect => "common rows between csv1 and csv2",
            Operation::Duplicates => "duplicates in a single file",
            Operation::Split => "split a CSV into multiple files",
            Operation::Filter => "filter rows by criteria",
            Operation::Sort => "sort rows by column",
        }
    }

    /// Default output file name; for split, the default name pattern
    pub fn default_output(&self) -> &'static str {
        match self {
            Operation::Merge => "merged.csv",
            Operation::Diff => "diff.csv",
            Operation::Intersect => "intersect.csv",
            Operation::Duplicates => "duplicates.csv",
            Operation::Split => DEFAULT_SPLIT_PATTERN,
            Operation::Filter => "filtered.csv",
            Operation::Sort => "sorted.csv",
        }
    }

    /// Menu label, e.g. `merge       (merge multiple CSV files)`
    pub fn label(&self) -> String {
        format!("{:<11} ({})", self.name(), self.description())
    }
}

/// One fully specified invocation
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Merge {
        inputs: Vec<PathBuf>,
        output: PathBuf,
    },
    Diff {
        left: PathBuf,
        right: PathBuf,
        key: String,
        output: PathBuf,
    },
    Intersect {
        left: PathBuf,
        right: PathBuf,
        key: String,
        output: PathBuf,
    },
    Duplicates {
        input: PathBuf,
        key: String,
        output: PathBuf,
    },
    Split {
        input: PathBuf,
        spec: SplitSpec,
        pattern: String,
    },
    Filter {
        input: PathBuf,
        spec: FilterSpec,
        output: PathBuf,
    },
    Sort {
        input: PathBuf,
        spec: SortSpec,
        output: PathBuf,
    },
}

impl Request {
    pub fn operation(&self) -> Operation {
        match self {
            Request::Merge { .. } => Operation::Merge,
            Request::Diff { .. } => Operation::Diff,
            Request::Intersect { .. } => Operation::Intersect,
            Request::Duplicates { .. } => Operation::Duplicates,
            Request::Split { .. } => Operation::Split,
            Request::Filter { .. } => Operation::Filter,
            Request::Sort { .. } => Operation::Sort,
        }
    }
}
