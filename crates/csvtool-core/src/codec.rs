//! CSV reading and writing for tables

use crate::error::{Error, Result};
use crate::table::{Row, Table};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Result of a write request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The file was written
    Written { path: PathBuf, rows: usize },
    /// The table was empty, nothing was written
    NothingToWrite,
}

/// Output encodings, chosen from the output file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Json,
}

impl OutputFormat {
    /// `.json` paths get JSON, everything else CSV
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => OutputFormat::Json,
            _ => OutputFormat::Csv,
        }
    }
}

/// Read a CSV file into a Table
pub fn read_table<P: AsRef<Path>>(path: P) -> Result<Table> {
    let path = path.as_ref();
    validate_source(path)?;

    let file = File::open(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let table = parse_reader(BufReader::new(file), path)?.with_source(path);
    debug!(
        path = %path.display(),
        rows = table.row_count(),
        columns = table.column_count(),
        "loaded table"
    );
    Ok(table)
}

/// Read two CSV files concurrently; both loads finish before either result is returned
pub fn read_pair<P: AsRef<Path> + Sync>(first: P, second: P) -> Result<(Table, Table)> {
    let (a, b) = rayon::join(|| read_table(&first), || read_table(&second));
    Ok((a?, b?))
}

/// Parse CSV from a string (useful for testing)
pub fn parse_table_str(content: &str, source_name: &str) -> Result<Table> {
    parse_reader(content.as_bytes(), Path::new(source_name))
}

fn validate_source(path: &Path) -> Result<()> {
    let meta = fs::metadata(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::SourceNotFound {
            path: path.to_path_buf(),
        },
        _ => Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    if !meta.is_file() {
        return Err(Error::NotAFile {
            path: path.to_path_buf(),
        });
    }

    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if !is_csv {
        warn!(path = %path.display(), "file doesn't have a .csv extension");
    }

    Ok(())
}

fn parse_reader<R: Read>(reader: R, path: &Path) -> Result<Table> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true) // Allow varying number of fields
        .from_reader(reader);

    let headers = csv_reader.headers().map_err(|e| Error::Csv {
        path: path.to_path_buf(),
        source: e,
    })?;

    // Repeated header names keep their first position
    let mut columns: Vec<String> = Vec::new();
    for name in headers.iter() {
        if !columns.iter().any(|c| c == name) {
            columns.push(name.to_string());
        }
    }
    let header: Vec<String> = headers.iter().map(str::to_string).collect();

    if header.is_empty() || (header.len() == 1 && header[0].is_empty()) {
        warn!(path = %path.display(), "CSV file is empty or contains no valid data");
        return Ok(Table::new(Vec::new()));
    }

    let mut rows = Vec::new();
    for (row_idx, result) in csv_reader.records().enumerate() {
        let record = result.map_err(|e| Error::Csv {
            path: path.to_path_buf(),
            source: e,
        })?;

        if record.len() > header.len() {
            warn!(
                path = %path.display(),
                row = row_idx + 1,
                "row has more cells than columns, truncating"
            );
        }

        let mut row = Row::new();
        for (i, name) in header.iter().enumerate() {
            row.insert(name.as_str(), record.get(i).unwrap_or(""));
        }
        rows.push(row);
    }

    if rows.is_empty() {
        warn!(path = %path.display(), "CSV file is empty or contains no valid data");
    }

    Ok(Table {
        columns,
        rows,
        source_path: None,
    })
}

/// Serialize a table as CSV text.
///
/// Columns follow the key order of the first row.
pub fn render_csv(table: &Table) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(&mut buf, table, Path::new("<memory>"))?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn write_csv<W: Write>(out: W, table: &Table, path: &Path) -> Result<()> {
    let csv_err = |e: csv::Error| Error::CsvWrite {
        path: path.to_path_buf(),
        source: e,
    };

    let Some(first) = table.rows.first() else {
        return Ok(());
    };
    let fields: Vec<&str> = first.columns().collect();

    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(&fields).map_err(csv_err)?;
    for row in &table.rows {
        writer
            .write_record(fields.iter().map(|f| row.get(f).unwrap_or("")))
            .map_err(csv_err)?;
    }
    writer.flush().map_err(|e| Error::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(())
}

fn write_json<W: Write>(mut out: W, table: &Table) -> Result<()> {
    serde_json::to_writer_pretty(&mut out, &table.rows)?;
    writeln!(out)?;
    Ok(())
}

/// Write a table to `path`, overwriting any existing file.
///
/// An empty table is not written and yields [`WriteOutcome::NothingToWrite`].
pub fn write_table<P: AsRef<Path>>(path: P, table: &Table) -> Result<WriteOutcome> {
    let path = path.as_ref();

    if table.is_empty() {
        warn!(path = %path.display(), "no results to write");
        return Ok(WriteOutcome::NothingToWrite);
    }

    check_write_permission(path)?;

    let file = File::create(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => Error::WritePermission {
            dir: parent_dir(path),
        },
        _ => Error::FileWrite {
            path: path.to_path_buf(),
            source: e,
        },
    })?;
    let mut writer = BufWriter::new(file);

    match OutputFormat::from_path(path) {
        OutputFormat::Csv => write_csv(&mut writer, table, path)?,
        OutputFormat::Json => write_json(&mut writer, table)?,
    }
    writer.flush().map_err(|e| Error::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })?;

    info!(path = %path.display(), rows = table.row_count(), "file written");
    Ok(WriteOutcome::Written {
        path: path.to_path_buf(),
        rows: table.row_count(),
    })
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// The destination directory must exist and not be read-only
fn check_write_permission(path: &Path) -> Result<()> {
    let dir = parent_dir(path);
    match fs::metadata(&dir) {
        Ok(meta) if meta.is_dir() && !meta.permissions().readonly() => Ok(()),
        _ => Err(Error::WritePermission { dir }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    #[test]
    fn test_parse_simple_csv() {
        let csv = "ID,Name,Value\n1,foo,100\n2,bar,200\n";
        let table = parse_table_str(csv, "test.csv").unwrap();

        assert_eq!(table.columns, vec!["ID", "Name", "Value"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].get("Name"), Some("foo"));
        assert_eq!(table.rows[1].get("Value"), Some("200"));
    }

    #[test]
    fn test_parse_keeps_raw_cells() {
        let csv = "email,name\n  A@x.com ,Ann\n";
        let table = parse_table_str(csv, "test.csv").unwrap();
        assert_eq!(table.rows[0].get("email"), Some("  A@x.com "));
    }

    #[test]
    fn test_parse_pads_short_and_truncates_long_rows() {
        let csv = "a,b,c\n1\n1,2,3,4\n";
        let table = parse_table_str(csv, "test.csv").unwrap();

        assert_eq!(table.rows[0].get("b"), Some(""));
        assert_eq!(table.rows[0].get("c"), Some(""));
        assert_eq!(table.rows[1].len(), 3);
        assert_eq!(table.rows[1].get("c"), Some("3"));
    }

    #[test]
    fn test_parse_quoted_fields() {
        let csv = "name,note\n\"Doe, Jane\",\"said \"\"hi\"\"\"\n";
        let table = parse_table_str(csv, "test.csv").unwrap();
        assert_eq!(table.rows[0].get("name"), Some("Doe, Jane"));
        assert_eq!(table.rows[0].get("note"), Some("said \"hi\""));
    }

    #[test]
    fn test_parse_empty_input() {
        let table = parse_table_str("", "empty.csv").unwrap();
        assert!(table.is_empty());
        assert!(table.columns.is_empty());

        let header_only = parse_table_str("a,b\n", "header.csv").unwrap();
        assert!(header_only.is_empty());
        assert_eq!(header_only.columns, vec!["a", "b"]);
    }

    #[test]
    fn test_render_uses_first_row_order_and_escapes() {
        let csv = "b,a\n\"x,y\",1\nplain,2\n";
        let table = parse_table_str(csv, "test.csv").unwrap();
        let out = render_csv(&table).unwrap();
        assert_eq!(out, "b,a\n\"x,y\",1\nplain,2\n");
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_table("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, Error::SourceNotFound { .. }));
        assert_eq!(err.kind(), ErrorKind::InvalidSource);
    }

    #[test]
    fn test_read_directory_is_not_a_file() {
        let dir = TempDir::new().unwrap();
        let err = read_table(dir.path()).unwrap_err();
        assert!(matches!(err, Error::NotAFile { .. }));
    }

    #[test]
    fn test_write_then_read_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let table = parse_table_str("id,name\n1,Ann\n2,Bob\n", "in.csv").unwrap();

        let outcome = write_table(&path, &table).unwrap();
        assert_eq!(
            outcome,
            WriteOutcome::Written {
                path: path.clone(),
                rows: 2
            }
        );

        let loaded = read_table(&path).unwrap();
        assert_eq!(loaded.rows, table.rows);
        assert_eq!(loaded.source_path, Some(path));
    }

    #[test]
    fn test_write_overwrites_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        fs::write(&path, "old,content\n1,2\n3,4\n5,6\n").unwrap();

        let table = parse_table_str("id\n7\n", "in.csv").unwrap();
        write_table(&path, &table).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "id\n7\n");
    }

    #[test]
    fn test_write_empty_table_is_noop() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let outcome = write_table(&path, &Table::default()).unwrap();
        assert_eq!(outcome, WriteOutcome::NothingToWrite);
        assert!(!path.exists());
    }

    #[test]
    fn test_write_into_missing_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope").join("out.csv");
        let table = parse_table_str("id\n1\n", "in.csv").unwrap();
        let err = write_table(&path, &table).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WritePermission);
    }

    #[test]
    fn test_write_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");
        let table = parse_table_str("id,name\n1,Ann\n", "in.csv").unwrap();
        write_table(&path, &table).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value[0]["id"], "1");
        assert_eq!(value[0]["name"], "Ann");
    }

    #[test]
    fn test_read_pair() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.csv");
        let b = dir.path().join("b.csv");
        fs::write(&a, "k\n1\n").unwrap();
        fs::write(&b, "k\n2\n3\n").unwrap();

        let (left, right) = read_pair(&a, &b).unwrap();
        assert_eq!(left.row_count(), 1);
        assert_eq!(right.row_count(), 2);

        let missing = dir.path().join("missing.csv");
        assert!(read_pair(&a, &missing).is_err());
    }
}
