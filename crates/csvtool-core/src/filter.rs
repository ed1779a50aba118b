//! Row filtering by a single-column predicate

use crate::error::{Error, Result};
use crate::normalize::normalize;
use crate::outcome::Outcome;
use crate::sort::parse_number;
use crate::table::{Row, Table};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Comparison applied to a column's value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    /// Numeric on the leading number of each side (`"34 kg"` is 34);
    /// false when either side does not start with a number
    GreaterThan,
    /// Numeric, read like [`FilterOperator::GreaterThan`]
    LessThan,
    /// Raw cell is blank after trimming
    Empty,
    NotEmpty,
}

impl FilterOperator {
    pub const ALL: [FilterOperator; 10] = [
        FilterOperator::Equals,
        FilterOperator::NotEquals,
        FilterOperator::Contains,
        FilterOperator::NotContains,
        FilterOperator::StartsWith,
        FilterOperator::EndsWith,
        FilterOperator::GreaterThan,
        FilterOperator::LessThan,
        FilterOperator::Empty,
        FilterOperator::NotEmpty,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FilterOperator::Equals => "equals",
            FilterOperator::NotEquals => "not_equals",
            FilterOperator::Contains => "contains",
            FilterOperator::NotContains => "not_contains",
            FilterOperator::StartsWith => "starts_with",
            FilterOperator::EndsWith => "ends_with",
            FilterOperator::GreaterThan => "greater_than",
            FilterOperator::LessThan => "less_than",
            FilterOperator::Empty => "empty",
            FilterOperator::NotEmpty => "not_empty",
        }
    }

    /// Short human description for menus
    pub fn description(&self) -> &'static str {
        match self {
            FilterOperator::Equals => "equals",
            FilterOperator::NotEquals => "does not equal",
            FilterOperator::Contains => "contains",
            FilterOperator::NotContains => "does not contain",
            FilterOperator::StartsWith => "starts with",
            FilterOperator::EndsWith => "ends with",
            FilterOperator::GreaterThan => "greater than (numeric)",
            FilterOperator::LessThan => "less than (numeric)",
            FilterOperator::Empty => "is empty",
            FilterOperator::NotEmpty => "is not empty",
        }
    }

    /// Whether the operator compares against a value
    pub fn takes_value(&self) -> bool {
        !matches!(self, FilterOperator::Empty | FilterOperator::NotEmpty)
    }
}

impl FromStr for FilterOperator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        FilterOperator::ALL
            .into_iter()
            .find(|op| op.name() == wanted)
            .ok_or_else(|| Error::invalid_parameter(format!("unknown operator '{}'", s.trim())))
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parameters of a filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub column: String,
    pub operator: FilterOperator,
    /// Comparison value; ignored by `empty` and `not_empty`
    pub value: String,
}

impl FilterSpec {
    pub fn new(
        column: impl Into<String>,
        operator: FilterOperator,
        value: impl Into<String>,
    ) -> Self {
        Self {
            column: column.into(),
            operator,
            value: value.into(),
        }
    }

    /// Evaluate the predicate against one row
    pub fn matches(&self, row: &Row) -> bool {
        let raw = row.get(&self.column);
        let cell = normalize(raw);
        let value = normalize(self.value.as_str());

        match self.operator {
            FilterOperator::Equals => cell == value,
            FilterOperator::NotEquals => cell != value,
            FilterOperator::Contains => cell.contains(&value),
            FilterOperator::NotContains => !cell.contains(&value),
            FilterOperator::StartsWith => cell.starts_with(&value),
            FilterOperator::EndsWith => cell.ends_with(&value),
            FilterOperator::GreaterThan => numeric(raw, &self.value, |a, b| a > b),
            FilterOperator::LessThan => numeric(raw, &self.value, |a, b| a < b),
            FilterOperator::Empty => raw.map_or(true, |v| v.trim().is_empty()),
            FilterOperator::NotEmpty => raw.is_some_and(|v| !v.trim().is_empty()),
        }
    }
}

fn numeric(cell: Option<&str>, value: &str, cmp: impl Fn(f64, f64) -> bool) -> bool {
    match (cell.and_then(parse_number), parse_number(value)) {
        (Some(a), Some(b)) => cmp(a, b),
        _ => false,
    }
}

/// Keep the rows matching `spec`, in their original order
pub fn filter(table: &Table, spec: &FilterSpec) -> Result<Outcome<Table>> {
    table.require_column(&spec.column)?;

    let rows: Vec<Row> = table
        .rows
        .iter()
        .filter(|row| spec.matches(row))
        .cloned()
        .collect();

    debug!(
        column = %spec.column,
        operator = %spec.operator,
        input = table.row_count(),
        matched = rows.len(),
        "filtered"
    );
    Ok(Outcome::table(table.derive(rows)))
}
