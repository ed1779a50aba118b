//! Stable column sort with string, number and date interpretations

use crate::error::{Error, Result};
use crate::outcome::Outcome;
use crate::table::{Row, Table};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// Number of leading rows inspected by [`SortType::Auto`]
pub const AUTO_SAMPLE_ROWS: usize = 10;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub const ALL: [SortOrder; 2] = [SortOrder::Asc, SortOrder::Desc];

    pub fn name(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Asc),
            "desc" | "descending" => Ok(SortOrder::Desc),
            other => Err(Error::invalid_parameter(format!(
                "unknown sort order '{other}' (expected asc or desc)"
            ))),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How cell text is interpreted for ordering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortType {
    /// Sniff the column, see [`resolve_type`]
    #[default]
    Auto,
    String,
    Number,
    Date,
}

impl SortType {
    pub const ALL: [SortType; 4] = [
        SortType::Auto,
        SortType::String,
        SortType::Number,
        SortType::Date,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SortType::Auto => "auto",
            SortType::String => "string",
            SortType::Number => "number",
            SortType::Date => "date",
        }
    }
}

impl FromStr for SortType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(SortType::Auto),
            "string" | "text" => Ok(SortType::String),
            "number" | "numeric" => Ok(SortType::Number),
            "date" => Ok(SortType::Date),
            other => Err(Error::invalid_parameter(format!(
                "unknown data type '{other}' (expected auto, string, number or date)"
            ))),
        }
    }
}

impl fmt::Display for SortType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parameters of a sort
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub column: String,
    pub order: SortOrder,
    pub data_type: SortType,
}

impl SortSpec {
    pub fn new(column: impl Into<String>, order: SortOrder, data_type: SortType) -> Self {
        Self {
            column: column.into(),
            order,
            data_type,
        }
    }
}

/// Parse the leading number of a cell, ignoring any trailing text.
///
/// `"34 kg"` reads as 34 and `"1.5e3x"` as 1500. `None` when the text does
/// not start with a number (after leading whitespace).
pub fn parse_number(value: &str) -> Option<f64> {
    let text = value.trim_start();
    let len = numeric_prefix_len(text);
    if len == 0 {
        return None;
    }
    text[..len].parse::<f64>().ok()
}

/// Byte length of the longest decimal literal at the start of `text`
fn numeric_prefix_len(text: &str) -> usize {
    let bytes = text.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    if text[end..].starts_with("Infinity") {
        return end + "Infinity".len();
    }

    let int_end = digits_from(end);
    let mut mantissa_end = int_end;
    let mut has_digits = int_end > end;
    if bytes.get(int_end) == Some(&b'.') {
        let frac_end = digits_from(int_end + 1);
        if has_digits || frac_end > int_end + 1 {
            has_digits = true;
            mantissa_end = frac_end;
        }
    }
    if !has_digits {
        return 0;
    }

    if matches!(bytes.get(mantissa_end), Some(b'e' | b'E')) {
        let mut exp = mantissa_end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            return exp_end;
        }
    }
    mantissa_end
}

/// Parse cell text as a point in time, in milliseconds since the Unix epoch.
///
/// Values without an offset are taken as UTC.
pub fn parse_date(value: &str) -> Option<i64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.timestamp_millis());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.timestamp_millis());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(value, fmt) {
            return d
                .and_hms_opt(0, 0, 0)
                .map(|dt| dt.and_utc().timestamp_millis());
        }
    }
    None
}

/// Resolve `requested` to a concrete type for `column`.
///
/// `Auto` looks at the non-blank values among the first
/// [`AUTO_SAMPLE_ROWS`] rows: all dates gives `Date`, otherwise all numbers
/// gives `Number`, otherwise `String`. A sample with no values is `String`.
pub fn resolve_type(table: &Table, column: &str, requested: SortType) -> SortType {
    if requested != SortType::Auto {
        return requested;
    }

    let sample: Vec<&str> = table
        .rows
        .iter()
        .take(AUTO_SAMPLE_ROWS)
        .filter_map(|row| row.get(column))
        .filter(|v| !v.trim().is_empty())
        .collect();

    if sample.is_empty() {
        SortType::String
    } else if sample.iter().all(|v| parse_date(v).is_some()) {
        SortType::Date
    } else if sample.iter().all(|v| parse_number(v).is_some()) {
        SortType::Number
    } else {
        SortType::String
    }
}

/// Sort key for one cell under a resolved type
#[derive(Debug, Clone, PartialEq)]
enum SortKey<'a> {
    Text(&'a str),
    /// `None` for unparseable text, ordered after every number
    Number(Option<f64>),
    /// `None` for unparseable text, ordered after every date
    Date(Option<i64>),
}

impl<'a> SortKey<'a> {
    fn of(row: &'a Row, column: &str, data_type: SortType) -> Self {
        let raw = row.get(column).unwrap_or("");
        match data_type {
            SortType::Number if raw.trim().is_empty() => SortKey::Number(Some(0.0)),
            SortType::Number => SortKey::Number(parse_number(raw)),
            SortType::Date if raw.trim().is_empty() => SortKey::Date(Some(0)),
            SortType::Date => SortKey::Date(parse_date(raw)),
            SortType::String | SortType::Auto => SortKey::Text(raw),
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Text(a), SortKey::Text(b)) => locale_compare(a, b),
            (SortKey::Number(a), SortKey::Number(b)) => {
                compare_missing_last(a, b, |x, y| x.total_cmp(y))
            }
            (SortKey::Date(a), SortKey::Date(b)) => compare_missing_last(a, b, Ord::cmp),
            // keys of one sort always share a variant
            _ => Ordering::Equal,
        }
    }
}

fn compare_missing_last<T>(
    a: &Option<T>,
    b: &Option<T>,
    cmp: impl Fn(&T, &T) -> Ordering,
) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => cmp(x, y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Case-insensitive collation with lower case first on ties
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    if folded != Ordering::Equal {
        return folded;
    }
    for (x, y) in a.chars().zip(b.chars()) {
        if x != y {
            return match (x.is_lowercase(), y.is_lowercase()) {
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                _ => x.cmp(&y),
            };
        }
    }
    a.len().cmp(&b.len())
}

/// A sorted table and the type its keys were compared as
#[derive(Debug, Clone, PartialEq)]
pub struct Sorted {
    pub table: Table,
    /// Never [`SortType::Auto`]
    pub data_type: SortType,
}

/// Sort a table by one column. The sort is stable; `Desc` reverses the
/// comparator, so equal keys keep their input order in both directions.
pub fn sort(table: &Table, spec: &SortSpec) -> Result<Outcome<Sorted>> {
    table.require_column(&spec.column)?;

    let data_type = resolve_type(table, &spec.column, spec.data_type);
    if spec.data_type == SortType::Auto {
        info!(column = %spec.column, "auto-detected data type: {data_type}");
    }

    let mut keyed: Vec<(SortKey<'_>, &Row)> = table
        .rows
        .iter()
        .map(|row| (SortKey::of(row, &spec.column, data_type), row))
        .collect();

    keyed.sort_by(|(a, _), (b, _)| {
        let ord = a.compare(b);
        match spec.order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });

    let rows: Vec<Row> = keyed.into_iter().map(|(_, row)| row.clone()).collect();
    debug!(
        column = %spec.column,
        order = %spec.order,
        data_type = %data_type,
        rows = rows.len(),
        "sorted"
    );
    Ok(Outcome::table(table.derive(rows)).map(|table| Sorted { table, data_type }))
}
