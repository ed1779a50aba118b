//! Partitioning a table into contiguous groups

use crate::error::{Error, Result};
use crate::outcome::{Advisory, Outcome};
use crate::table::Table;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;
use tracing::debug;

/// How the group size is derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SplitMode {
    /// Value is the number of groups to produce
    FileCount,
    /// Value is the maximum number of rows per group
    MaxLines,
}

impl SplitMode {
    pub const ALL: [SplitMode; 2] = [SplitMode::FileCount, SplitMode::MaxLines];

    pub fn name(&self) -> &'static str {
        match self {
            SplitMode::FileCount => "fileCount",
            SplitMode::MaxLines => "maxLines",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SplitMode::FileCount => "by number of files",
            SplitMode::MaxLines => "by maximum rows per file",
        }
    }
}

impl FromStr for SplitMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "filecount" => Ok(SplitMode::FileCount),
            "maxlines" => Ok(SplitMode::MaxLines),
            _ => Err(Error::invalid_parameter(format!(
                "unknown split mode '{}' (expected fileCount or maxLines)",
                s.trim()
            ))),
        }
    }
}

impl fmt::Display for SplitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parameters of a split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitSpec {
    pub mode: SplitMode,
    pub value: NonZeroUsize,
}

impl SplitSpec {
    /// Build from a mode and a count that must be positive
    pub fn new(mode: SplitMode, value: i64) -> Result<Self> {
        usize::try_from(value)
            .ok()
            .and_then(NonZeroUsize::new)
            .map(|value| Self { mode, value })
            .ok_or_else(|| {
                Error::invalid_parameter(format!("{mode} must be greater than 0, got {value}"))
            })
    }

    /// Build from user-supplied text
    pub fn parse(mode: &str, value: &str) -> Result<Self> {
        let mode: SplitMode = mode.parse()?;
        let count = value.trim().parse::<i64>().map_err(|_| {
            Error::invalid_parameter(format!("{mode} must be a positive integer, got '{}'", value.trim()))
        })?;
        Self::new(mode, count)
    }

    /// Rows per group for a table of `total` rows
    pub fn group_size(&self, total: usize) -> usize {
        match self.mode {
            SplitMode::FileCount => total.div_ceil(self.value.get()).max(1),
            SplitMode::MaxLines => self.value.get(),
        }
    }
}

/// Divide `table` into contiguous groups. Only non-empty groups are returned.
pub fn split(table: &Table, spec: &SplitSpec) -> Result<Outcome<Vec<Table>>> {
    let size = spec.group_size(table.row_count());
    let groups: Vec<Table> = table
        .rows
        .chunks(size)
        .map(|chunk| table.derive(chunk.to_vec()))
        .collect();

    debug!(
        mode = %spec.mode,
        value = spec.value.get(),
        rows = table.row_count(),
        groups = groups.len(),
        "split"
    );

    let outcome = Outcome::clean(groups);
    if outcome.value.is_empty() {
        Ok(outcome.with_advisory(Advisory::EmptyResult))
    } else {
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::parse_table_str;
    use crate::error::ErrorKind;

    fn numbered(n: usize) -> Table {
        let mut csv = String::from("n\n");
        for i in 1..=n {
            csv.push_str(&format!("{i}\n"));
        }
        parse_table_str(&csv, "numbers.csv").unwrap()
    }

    fn sizes(table: &Table, mode: &str, value: &str) -> Vec<usize> {
        let spec = SplitSpec::parse(mode, value).unwrap();
        split(table, &spec)
            .unwrap()
            .value
            .iter()
            .map(Table::row_count)
            .collect()
    }

    #[test]
    fn test_file_count() {
        assert_eq!(sizes(&numbered(10), "fileCount", "3"), vec![4, 4, 2]);
        assert_eq!(sizes(&numbered(10), "fileCount", "1"), vec![10]);
        assert_eq!(sizes(&numbered(9), "fileCount", "3"), vec![3, 3, 3]);
    }

    #[test]
    fn test_max_lines() {
        assert_eq!(sizes(&numbered(10), "maxLines", "4"), vec![4, 4, 2]);
        assert_eq!(sizes(&numbered(3), "maxLines", "10"), vec![3]);
    }

    #[test]
    fn test_file_count_above_row_count_drops_empty_groups() {
        assert_eq!(sizes(&numbered(3), "fileCount", "5"), vec![1, 1, 1]);
        // ceil(10 / 6) = 2 leaves the sixth group empty
        assert_eq!(sizes(&numbered(10), "fileCount", "6"), vec![2, 2, 2, 2, 2]);
    }

    #[test]
    fn test_groups_are_contiguous_and_ordered() {
        let t = numbered(7);
        let spec = SplitSpec::new(SplitMode::MaxLines, 3).unwrap();
        let groups = split(&t, &spec).unwrap().value;
        let flattened: Vec<&str> = groups
            .iter()
            .flat_map(|g| g.rows.iter().map(|r| r.get("n").unwrap_or_default()))
            .collect();
        assert_eq!(flattened, vec!["1", "2", "3", "4", "5", "6", "7"]);
        assert!(groups.iter().all(|g| g.columns == vec!["n"]));
    }

    #[test]
    fn test_empty_table_has_no_groups() {
        let t = Table::new(vec!["n".to_string()]);
        let spec = SplitSpec::new(SplitMode::FileCount, 2).unwrap();
        let result = split(&t, &spec).unwrap();
        assert!(result.value.is_empty());
        assert!(result.has(&Advisory::EmptyResult));
    }

    #[test]
    fn test_invalid_parameters() {
        for (mode, value) in [
            ("fileCount", "0"),
            ("fileCount", "-2"),
            ("maxLines", "abc"),
            ("maxLines", ""),
            ("byColor", "3"),
        ] {
            let err = SplitSpec::parse(mode, value).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidParameter, "{mode} {value}");
        }
    }

    #[test]
    fn test_mode_spellings() {
        assert_eq!("file-count".parse::<SplitMode>().unwrap(), SplitMode::FileCount);
        assert_eq!("max_lines".parse::<SplitMode>().unwrap(), SplitMode::MaxLines);
        assert_eq!("MAXLINES".parse::<SplitMode>().unwrap(), SplitMode::MaxLines);
    }
}
