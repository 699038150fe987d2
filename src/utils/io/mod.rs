//! Tabular file I/O
//!
//! [`read_frame`] and [`write_frame`] pick the format from the lowercase file
//! extension. Feather and Parquet keep the designated index in the schema
//! metadata under [`INDEX_METADATA_KEY`]; CSV does not record it.

pub mod csv;
pub mod excel;
pub mod ipc;
pub mod parquet;

use std::path::Path;
use std::sync::Arc;

use arrow::datatypes::Schema;
use arrow::record_batch::RecordBatch;

use crate::config::IoConfig;
use crate::enum_table::EnumTable;
use crate::error::{Error, Result};
use crate::frame::Frame;

pub use excel::{excel_to_csv, read_excel};

/// Schema metadata key holding the index column name
pub const INDEX_METADATA_KEY: &str = "tsframe:index";

/// Supported tabular file formats, keyed by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumTable)]
#[enum_table(value_type = "&'static str")]
pub enum FileFormat {
    #[enum_table(value = ".csv")]
    Csv,
    #[enum_table(value = ".feather")]
    Feather,
    #[enum_table(value = ".parquet")]
    Parquet,
}

impl FileFormat {
    /// Format matching the extension of `path`, compared in lowercase
    ///
    /// # Errors
    /// Returns [`Error::UnsupportedFormat`] for any other extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let suffix = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
            .unwrap_or_default();
        let format = Self::VARIANTS.iter().copied().find(|f| f.value() == suffix);
        format.ok_or_else(|| Error::UnsupportedFormat {
            suffix,
            path: path.to_path_buf(),
        })
    }
}

/// Read a CSV, Feather or Parquet file with settings from the environment
///
/// # Errors
/// Returns [`Error::UnsupportedFormat`] for other extensions, or the error
/// of the underlying reader
pub fn read_frame(path: impl AsRef<Path>) -> Result<Frame> {
    read_frame_with_config(path, &IoConfig::from_env())
}

/// Read a CSV, Feather or Parquet file
///
/// # Errors
/// Returns [`Error::UnsupportedFormat`] for other extensions, or the error
/// of the underlying reader
pub fn read_frame_with_config(path: impl AsRef<Path>, config: &IoConfig) -> Result<Frame> {
    let path = path.as_ref();
    match FileFormat::from_path(path)? {
        FileFormat::Csv => csv::read_csv(path, config),
        FileFormat::Feather => ipc::read_feather(path),
        FileFormat::Parquet => parquet::read_parquet(path, config),
    }
}

/// Write a frame as CSV, Feather or Parquet with settings from the environment
///
/// `index` controls whether the index is written: `None` writes it unless it
/// is the default positional index.
///
/// # Errors
/// Returns [`Error::UnsupportedFormat`] for other extensions, or the error
/// of the underlying writer
pub fn write_frame(frame: &Frame, path: impl AsRef<Path>, index: Option<bool>) -> Result<()> {
    write_frame_with_config(frame, path, index, &IoConfig::from_env())
}

/// Write a frame as CSV, Feather or Parquet
///
/// # Errors
/// Returns [`Error::UnsupportedFormat`] for other extensions, or the error
/// of the underlying writer
pub fn write_frame_with_config(
    frame: &Frame,
    path: impl AsRef<Path>,
    index: Option<bool>,
    config: &IoConfig,
) -> Result<()> {
    let path = path.as_ref();
    match FileFormat::from_path(path)? {
        FileFormat::Csv => csv::write_csv(frame, path, index, config),
        FileFormat::Feather => ipc::write_feather(frame, path, index),
        FileFormat::Parquet => parquet::write_parquet(frame, path, index),
    }
}

/// Batch to store for `frame`, the index name recorded in the metadata
///
/// With `index == Some(false)` the index column is left out.
pub(crate) fn batch_for_storage(frame: &Frame, index: Option<bool>) -> Result<RecordBatch> {
    let batch = frame.batch();
    let schema = batch.schema();
    let mut metadata = schema.metadata().clone();
    metadata.remove(INDEX_METADATA_KEY);

    let skip = match frame.index_name() {
        Some(name) if index == Some(false) => Some(name),
        Some(name) => {
            metadata.insert(INDEX_METADATA_KEY.to_string(), name.to_string());
            None
        }
        None => None,
    };
    let (fields, columns): (Vec<_>, Vec<_>) = schema
        .fields()
        .iter()
        .zip(batch.columns())
        .filter(|(field, _)| Some(field.name().as_str()) != skip)
        .map(|(field, column)| (Arc::clone(field), Arc::clone(column)))
        .unzip();
    let schema = Schema::new_with_metadata(fields, metadata);
    Ok(RecordBatch::try_new_with_options(
        Arc::new(schema),
        columns,
        &arrow::record_batch::RecordBatchOptions::new().with_row_count(Some(batch.num_rows())),
    )?)
}

/// Frame for a stored batch, restoring the index recorded in the metadata
pub(crate) fn frame_from_storage(batch: RecordBatch) -> Result<Frame> {
    let schema = batch.schema();
    let mut metadata = schema.metadata().clone();
    let index = metadata
        .remove(INDEX_METADATA_KEY)
        .filter(|name| schema.index_of(name).is_ok());
    let schema = Schema::new_with_metadata(schema.fields().clone(), metadata);
    let batch = RecordBatch::try_new_with_options(
        Arc::new(schema),
        batch.columns().to_vec(),
        &arrow::record_batch::RecordBatchOptions::new().with_row_count(Some(batch.num_rows())),
    )?;
    Frame::new(batch, index.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(FileFormat::from_path(Path::new("a/b.CSV")).unwrap(), FileFormat::Csv);
        assert_eq!(
            FileFormat::from_path(Path::new("b.parquet")).unwrap(),
            FileFormat::Parquet
        );
        match FileFormat::from_path(Path::new("data/b.xls")) {
            Err(Error::UnsupportedFormat { suffix, path }) => {
                assert_eq!(suffix, ".xls");
                assert_eq!(path, PathBuf::from("data/b.xls"));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            FileFormat::from_path(Path::new("noext")),
            Err(Error::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_read_unsupported() {
        assert!(matches!(
            read_frame("table.json"),
            Err(Error::UnsupportedFormat { .. })
        ));
    }
}
