//! Error handling for tsframe.
//!
//! Every fallible operation in the crate returns [`Result`]. Shape and key
//! errors are raised immediately and never recovered internally; errors from
//! the underlying engines are wrapped unchanged.

use std::io;
use std::path::PathBuf;

use arrow::error::ArrowError;
use parquet::errors::ParquetError;

/// Specialized error type for tsframe
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The value's runtime shape is not one of the supported time shapes
    #[error("Unsupported type for time: {0}")]
    UnsupportedType(String),

    /// The value does not match any shape the operation accepts
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// A requested index or column name is absent from the table
    #[error("Invalid key '{key}': must be the index name or one of the columns")]
    KeyNotFound { key: String },

    /// The file extension has no reader or writer
    #[error("file format not supported: '{suffix}' ({})", path.display())]
    UnsupportedFormat { suffix: String, path: PathBuf },

    /// Timezone descriptor could not be parsed
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// Frequency string or duration could not be used as a fixed step
    #[error("Invalid frequency: {0}")]
    InvalidFrequency(String),

    /// A string could not be parsed into a timestamp
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Reindexing requires unique index labels
    #[error("cannot reindex on an axis with duplicate labels ({0})")]
    DuplicateIndex(String),

    /// Glob pattern could not be compiled
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    /// Error opening, reading or writing a file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error from the Arrow engine
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// Error processing Parquet data
    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),

    /// JSON serialization or parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error reading an Excel workbook
    #[error("Excel read error: {0}")]
    Excel(#[from] calamine::XlsxError),

    /// Error converting between records and record batches
    #[error("Record conversion error: {0}")]
    Records(#[from] serde_arrow::Error),
}

impl Error {
    /// Shorthand for a [`Error::KeyNotFound`]
    pub fn key_not_found(key: impl Into<String>) -> Self {
        Self::KeyNotFound { key: key.into() }
    }

    /// Shorthand for a [`Error::TypeMismatch`]
    pub fn type_mismatch(expected: impl Into<String>, found: impl std::fmt::Display) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.to_string(),
        }
    }
}

/// Result type for tsframe operations
pub type Result<T> = std::result::Result<T, Error>;
