//! Feather (Arrow IPC file) reading and writing

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::time::Instant;

use arrow::compute::concat_batches;
use arrow::ipc::reader::FileReader;
use arrow::ipc::writer::FileWriter;

use super::{batch_for_storage, frame_from_storage};
use crate::error::Result;
use crate::frame::Frame;
use crate::utils::logging::{log_operation_complete, log_operation_start};

/// Write a frame to a Feather file
///
/// The index is kept unless `index` is `Some(false)`.
///
/// # Errors
/// Returns an IO or Arrow error if the file cannot be written
pub fn write_feather(frame: &Frame, path: &Path, index: Option<bool>) -> Result<()> {
    let start = Instant::now();
    log_operation_start("Writing Feather file", path);
    let batch = batch_for_storage(frame, index)?;
    let file = BufWriter::new(File::create(path)?);
    let mut writer = FileWriter::try_new(file, &batch.schema())?;
    writer.write(&batch)?;
    writer.finish()?;
    log_operation_complete("Wrote", path, batch.num_rows(), Some(start.elapsed()));
    Ok(())
}

/// Read a Feather file, restoring its index
///
/// # Errors
/// Returns an IO or Arrow error if the file cannot be read
pub fn read_feather(path: &Path) -> Result<Frame> {
    let start = Instant::now();
    log_operation_start("Reading Feather file", path);
    let reader = FileReader::try_new(BufReader::new(File::open(path)?), None)?;
    let schema = reader.schema();
    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
    let frame = frame_from_storage(concat_batches(&schema, &batches)?)?;
    log_operation_complete("Read", path, frame.num_rows(), Some(start.elapsed()));
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test::frames_equal;
    use arrow::array::{ArrayRef, Int64Array, TimestampNanosecondArray};
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_index_survives_round_trip() {
        let times = TimestampNanosecondArray::from(vec![0, 1_000]).with_timezone("Asia/Shanghai");
        let frame = Frame::from_columns(
            vec![
                ("v", Arc::new(Int64Array::from(vec![1, 2])) as ArrayRef),
                ("time", Arc::new(times) as ArrayRef),
            ],
            Some("time"),
        )
        .unwrap();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("t.feather");
        write_feather(&frame, &path, None).unwrap();

        let back = read_feather(&path).unwrap();
        assert_eq!(back.index_name(), Some("time"));
        assert!(frames_equal(&back, &frame));
        assert!(back.schema().metadata().is_empty());

        write_feather(&frame, &path, Some(false)).unwrap();
        let dropped = read_feather(&path).unwrap();
        assert!(dropped.index_name().is_none());
        assert_eq!(dropped.columns(), vec!["v"]);
    }
}
