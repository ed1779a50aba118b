//! Running a request: load inputs, apply one engine operation, write outputs

use crate::request::{Operation, Request};
use csvtool_core::{
    diff, duplicates, filter, intersect, merge_files, read_pair, read_table, sort, split,
    write_table, Advisory, Outcome, Result, Table, WriteOutcome,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// What an executed request did
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub operation: Operation,
    pub advisories: Vec<Advisory>,
    pub writes: Vec<WriteOutcome>,
    pub notes: Vec<String>,
}

impl Report {
    fn new(operation: Operation, advisories: Vec<Advisory>) -> Self {
        Self {
            operation,
            advisories,
            writes: Vec::new(),
            notes: Vec::new(),
        }
    }

    /// Paths of the files actually written
    pub fn written_paths(&self) -> Vec<&Path> {
        self.writes
            .iter()
            .filter_map(|w| match w {
                WriteOutcome::Written { path, .. } => Some(path.as_path()),
                WriteOutcome::NothingToWrite => None,
            })
            .collect()
    }

    /// Print the report for the user
    pub fn print<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for advisory in &self.advisories {
            match advisory {
                Advisory::EmptyResult => {
                    writeln!(out, "Warning: {} produced no rows.", self.operation.name())?
                }
                other => writeln!(out, "Warning: {other}")?,
            }
        }
        for note in &self.notes {
            writeln!(out, "{note}")?;
        }
        for write in &self.writes {
            match write {
                WriteOutcome::Written { path, rows } => {
                    writeln!(out, "File written: {} ({} row(s))", path.display(), rows)?
                }
                WriteOutcome::NothingToWrite => writeln!(out, "No results to write.")?,
            }
        }
        Ok(())
    }
}

/// Execute one request end to end
pub fn execute(request: &Request) -> Result<Report> {
    debug!(operation = request.operation().name(), "executing request");

    match request {
        Request::Merge { inputs, output } => {
            let outcome = merge_files(inputs.as_slice())?;
            write_single(Operation::Merge, outcome, output)
        }
        Request::Diff {
            left,
            right,
            key,
            output,
        } => {
            let (left, right) = read_pair(left, right)?;
            write_single(Operation::Diff, diff(&left, &right, key)?, output)
        }
        Request::Intersect {
            left,
            right,
            key,
            output,
        } => {
            let (left, right) = read_pair(left, right)?;
            write_single(Operation::Intersect, intersect(&left, &right, key)?, output)
        }
        Request::Duplicates { input, key, output } => {
            let table = read_table(input)?;
            write_single(Operation::Duplicates, duplicates(&table, key)?, output)
        }
        Request::Filter {
            input,
            spec,
            output,
        } => {
            let table = read_table(input)?;
            let outcome = filter(&table, spec)?;
            let matched = outcome.value.row_count();
            let mut report = write_single(Operation::Filter, outcome, output)?;
            if matched > 0 {
                report
                    .notes
                    .push(format!("Found {matched} rows matching the criteria."));
            }
            Ok(report)
        }
        Request::Sort {
            input,
            spec,
            output,
        } => {
            let table = read_table(input)?;
            let outcome = sort(&table, spec)?;
            let data_type = outcome.value.data_type;
            let outcome = outcome.map(|sorted| sorted.table);
            let rows = outcome.value.row_count();
            let mut report = write_single(Operation::Sort, outcome, output)?;
            report.notes.push(format!(
                "Sorted {rows} rows by '{}' ({}, {data_type})",
                spec.column, spec.order
            ));
            Ok(report)
        }
        Request::Split {
            input,
            spec,
            pattern,
        } => {
            let table = read_table(input)?;
            let outcome = split(&table, spec)?;
            let mut report = Report::new(Operation::Split, outcome.advisories);
            for (i, group) in outcome.value.iter().enumerate() {
                report
                    .writes
                    .push(write_table(split_output_path(pattern, i + 1), group)?);
            }
            report
                .notes
                .push(format!("Generated {} file(s).", report.written_paths().len()));
            Ok(report)
        }
    }
}

/// Output path of the `n`th split group (1-based)
pub fn split_output_path(pattern: &str, n: usize) -> PathBuf {
    PathBuf::from(format!("{pattern}_{n}.csv"))
}

fn write_single(operation: Operation, outcome: Outcome<Table>, output: &Path) -> Result<Report> {
    let mut report = Report::new(operation, outcome.advisories);
    report.writes.push(write_table(output, &outcome.value)?);
    Ok(report)
}
