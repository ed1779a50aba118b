//! csvtool-core: Row-set transformation engine for CSV tables
//!
//! This library provides functionality to:
//! - Parse CSV files into ordered tables and write them back (CSV or JSON)
//! - Merge tables with differing columns under the union of their headers
//! - Select rows by normalized key: diff, intersect and duplicates
//! - Filter rows with a single-column predicate
//! - Sort rows by a column as text, number or date
//! - Split a table into contiguous groups
//!
//! Every operation returns `Result<Outcome<_>>`: failures are [`Error`]s,
//! while non-fatal conditions travel as [`Advisory`] values on the outcome.

pub mod codec;
pub mod error;
pub mod filter;
pub mod merger;
pub mod normalize;
pub mod outcome;
pub mod scanner;
pub mod setops;
pub mod sort;
pub mod split;
pub mod table;

pub use codec::{
    parse_table_str, read_pair, read_table, render_csv, write_table, OutputFormat, WriteOutcome,
};
pub use error::{Error, ErrorKind, Result};
pub use filter::{filter, FilterOperator, FilterSpec};
pub use merger::{merge_files, merge_tables};
pub use normalize::normalize;
pub use outcome::{Advisory, Outcome, SourceColumns};
pub use scanner::discover_csv_files;
pub use setops::{diff, duplicates, intersect};
pub use sort::{resolve_type, sort, SortOrder, SortSpec, SortType, Sorted};
pub use split::{split, SplitMode, SplitSpec};
pub use table::{Row, Table};
