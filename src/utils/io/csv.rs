//! CSV reading and writing
//!
//! Files are written as UTF-8 with a byte order mark (unless disabled in
//! [`IoConfig`]) and the mark is stripped again on read. The schema of a read
//! file is inferred from its content.

use std::fs::{self, File};
use std::io::{BufWriter, Cursor, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use arrow::array::{ArrayRef, Int64Array};
use arrow::compute::concat_batches;
use arrow::csv::reader::Format;
use arrow::csv::{ReaderBuilder, WriterBuilder};
use arrow::record_batch::RecordBatch;

use crate::config::IoConfig;
use crate::error::Result;
use crate::frame::{Frame, is_default_index};
use crate::utils::arrow::build_batch;
use crate::utils::logging::{log_operation_complete, log_operation_start};

/// UTF-8 byte order mark
pub const BOM: &[u8] = b"\xEF\xBB\xBF";

/// Batch holding exactly the columns to write
///
/// The index is written when `index` says so, or by default when it is not
/// the positional index. A requested positional index becomes an unnamed
/// leading column.
fn batch_to_write(frame: &Frame, index: Option<bool>) -> Result<RecordBatch> {
    let write_index = index.unwrap_or(!is_default_index(frame));
    let mut columns = frame.named_columns();
    match frame.index_name() {
        Some(name) if !write_index => columns.retain(|(column, _)| column != name),
        None if write_index => {
            let positions: ArrayRef =
                Arc::new(Int64Array::from_iter_values(0..frame.num_rows() as i64));
            columns.insert(0, (String::new(), positions));
        }
        _ => {}
    }
    build_batch(columns, frame.num_rows(), Default::default())
}

/// Write a frame to a CSV file
///
/// # Arguments
/// * `frame` - Table to write
/// * `path` - Destination file, replaced if it exists
/// * `index` - Whether to write the index, `None` for "unless positional"
/// * `config` - Delimiter and byte order mark settings
///
/// # Errors
/// Returns an IO error if the file cannot be written, or an Arrow error if a
/// value cannot be formatted
pub fn write_csv(frame: &Frame, path: &Path, index: Option<bool>, config: &IoConfig) -> Result<()> {
    let start = Instant::now();
    log_operation_start("Writing CSV file", path);
    let batch = batch_to_write(frame, index)?;

    let mut file = BufWriter::new(File::create(path)?);
    if config.csv_bom {
        file.write_all(BOM)?;
    }
    let mut writer = WriterBuilder::new()
        .with_header(true)
        .with_delimiter(config.csv_delimiter)
        .build(file);
    writer.write(&batch)?;
    writer.into_inner().flush()?;

    log_operation_complete("Wrote", path, batch.num_rows(), Some(start.elapsed()));
    Ok(())
}

/// Read a CSV file with a header row
///
/// # Errors
/// Returns an IO error if the file cannot be read, or an Arrow error if its
/// content cannot be parsed
pub fn read_csv(path: &Path, config: &IoConfig) -> Result<Frame> {
    let start = Instant::now();
    log_operation_start("Reading CSV file", path);
    let bytes = fs::read(path)?;
    let content = bytes.strip_prefix(BOM).unwrap_or(&bytes);
    let frame = read_csv_bytes(content, config)?;
    log_operation_complete("Read", path, frame.num_rows(), Some(start.elapsed()));
    Ok(frame)
}

/// Parse CSV content held in memory
///
/// # Errors
/// Returns an Arrow error if the content cannot be parsed
pub fn read_csv_bytes(content: &[u8], config: &IoConfig) -> Result<Frame> {
    let format = Format::default()
        .with_header(true)
        .with_delimiter(config.csv_delimiter);
    let mut cursor = Cursor::new(content);
    let (schema, _) = format.infer_schema(&mut cursor, config.infer_rows)?;
    cursor.seek(SeekFrom::Start(0))?;

    let schema = Arc::new(schema);
    let reader = ReaderBuilder::new(Arc::clone(&schema))
        .with_format(format)
        .with_batch_size(config.batch_size)
        .build(cursor)?;
    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(Frame::from_batch(concat_batches(&schema, &batches)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::set_index;
    use arrow::array::{Float64Array, StringArray};
    use tempfile::TempDir;

    fn sample() -> Frame {
        Frame::from_columns(
            vec![
                ("id", Arc::new(StringArray::from(vec!["a", "b"])) as ArrayRef),
                ("v", Arc::new(Float64Array::from(vec![Some(1.5), None])) as ArrayRef),
            ],
            None,
        )
        .unwrap()
    }

    fn written(frame: &Frame, index: Option<bool>) -> String {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        write_csv(frame, &path, index, &IoConfig::default()).unwrap();
        let bytes = fs::read(&path).unwrap();
        assert!(bytes.starts_with(BOM));
        String::from_utf8(bytes[BOM.len()..].to_vec()).unwrap()
    }

    #[test]
    fn test_default_index_not_written() {
        assert_eq!(written(&sample(), None), "id,v\na,1.5\nb,\n");
        assert_eq!(written(&sample(), Some(true)), ",id,v\n0,a,1.5\n1,b,\n");
    }

    #[test]
    fn test_named_index_written_first() {
        let mut frame = sample();
        set_index(&mut frame, "v").unwrap();
        let mut frame2 = sample();
        set_index(&mut frame2, "id").unwrap();
        assert_eq!(written(&frame2, None), "id,v\na,1.5\nb,\n");
        assert_eq!(written(&frame2, Some(false)), "v\n1.5\n\n");
        assert!(written(&frame, None).starts_with("v,id\n"));
    }

    #[test]
    fn test_read_strips_bom_and_infers() {
        let mut content = BOM.to_vec();
        content.extend_from_slice(b"name,count,ratio\nx,1,0.5\ny,2,\n");
        let frame = read_csv_bytes(content.strip_prefix(BOM).unwrap(), &IoConfig::default()).unwrap();
        assert_eq!(frame.columns(), vec!["name", "count", "ratio"]);
        assert_eq!(
            frame.column("count").unwrap().data_type(),
            &arrow::datatypes::DataType::Int64
        );
        assert_eq!(frame.column("ratio").unwrap().null_count(), 1);
    }

    #[test]
    fn test_round_trip_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("t.csv");
        write_csv(&sample(), &path, None, &IoConfig::default()).unwrap();
        let back = read_csv(&path, &IoConfig::default()).unwrap();
        assert_eq!(back.columns(), vec!["id", "v"]);
        assert_eq!(back.num_rows(), 2);
    }
}
