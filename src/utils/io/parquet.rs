//! Parquet reading and writing

use std::fs::File;
use std::path::Path;
use std::time::Instant;

use arrow::compute::concat_batches;
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::file::properties::WriterProperties;

use super::{batch_for_storage, frame_from_storage};
use crate::config::IoConfig;
use crate::error::Result;
use crate::frame::Frame;
use crate::utils::logging::{log_operation_complete, log_operation_start};

/// Write a frame to a Parquet file
///
/// The index is kept unless `index` is `Some(false)`.
///
/// # Errors
/// Returns an IO or Parquet error if the file cannot be written
pub fn write_parquet(frame: &Frame, path: &Path, index: Option<bool>) -> Result<()> {
    let start = Instant::now();
    log_operation_start("Writing parquet file", path);
    let batch = batch_for_storage(frame, index)?;
    let file = File::create(path)?;
    let props = WriterProperties::builder().build();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
    writer.write(&batch)?;
    writer.close()?;
    log_operation_complete("Wrote", path, batch.num_rows(), Some(start.elapsed()));
    Ok(())
}

/// Read a Parquet file, restoring its index
///
/// Batches of `config.batch_size` rows are read and concatenated.
///
/// # Errors
/// Returns an IO or Parquet error if the file cannot be read
pub fn read_parquet(path: &Path, config: &IoConfig) -> Result<Frame> {
    let start = Instant::now();
    log_operation_start("Reading parquet file", path);
    let builder = ParquetRecordBatchReaderBuilder::try_new(File::open(path)?)?;
    let schema = builder.schema().clone();
    let reader = builder.with_batch_size(config.batch_size).build()?;
    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
    let frame = frame_from_storage(concat_batches(&schema, &batches)?)?;
    log_operation_complete("Read", path, frame.num_rows(), Some(start.elapsed()));
    Ok(frame)
}
