//! Error types for csvtool-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort an operation
#[derive(Debug, Error)]
pub enum Error {
    /// Input path does not exist
    #[error("file not found: '{path}'")]
    SourceNotFound { path: PathBuf },

    /// Input path exists but is not a regular file
    #[error("path is not a file: '{path}'")]
    NotAFile { path: PathBuf },

    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV parsing error from the csv crate
    #[error("CSV error in '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A key or column is missing from a table's representative row
    #[error("key '{key}' not found; available columns: {}", .available.join(", "))]
    KeyNotFound { key: String, available: Vec<String> },

    /// Malformed operation parameter
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Destination directory missing or not writable
    #[error("no write permission for directory '{dir}'")]
    WritePermission { dir: PathBuf },

    /// Failed to write an output file
    #[error("failed to write file '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV serialization error
    #[error("failed to write CSV '{path}': {source}")]
    CsvWrite {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Directory traversal error
    #[error("failed to traverse directory: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input missing, not a file, or not parseable as CSV
    InvalidSource,
    /// Named key/column absent
    KeyNotFound,
    /// Bad split mode/value or filter operator
    InvalidParameter,
    /// Output directory not writable
    WritePermission,
    /// Any other I/O or serialization failure
    Io,
}

impl Error {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::SourceNotFound { .. }
            | Error::NotAFile { .. }
            | Error::FileRead { .. }
            | Error::Csv { .. } => ErrorKind::InvalidSource,
            Error::KeyNotFound { .. } => ErrorKind::KeyNotFound,
            Error::InvalidParameter(_) => ErrorKind::InvalidParameter,
            Error::WritePermission { .. } => ErrorKind::WritePermission,
            Error::FileWrite { .. }
            | Error::CsvWrite { .. }
            | Error::WalkDir(_)
            | Error::Io(_)
            | Error::Json(_) => ErrorKind::Io,
        }
    }

    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Error::InvalidParameter(message.into())
    }
}
