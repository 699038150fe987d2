//! Excel workbook to CSV conversion
//!
//! The first sheet of each workbook is read with its first row as header and
//! a type inferred per column, then written as CSV.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use arrow::array::{
    ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray, TimestampNanosecondArray,
};
use calamine::{DataType, Reader, Xlsx, open_workbook};
use rayon::prelude::*;
use rustc_hash::FxHashMap;

use super::csv::write_csv;
use crate::config::IoConfig;
use crate::error::Result;
use crate::frame::Frame;
use crate::utils::arrow::build_batch;
use crate::utils::logging::{
    create_main_progress_bar, finish_progress_bar, log_operation_complete, log_operation_start,
};
use crate::utils::paths::{PathKind, create_dir, get_paths};

/// Days from the spreadsheet epoch (1899-12-30) to the Unix epoch
const EXCEL_UNIX_EPOCH_DAYS: f64 = 25_569.0;
const MILLIS_PER_DAY: f64 = 86_400_000.0;
const NANOS_PER_MILLI: i64 = 1_000_000;

/// A spreadsheet cell reduced to the shapes a column can take
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Empty,
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Nanoseconds since the Unix epoch
    DateTime(i64),
    Text(String),
}

impl From<&DataType> for Cell {
    fn from(value: &DataType) -> Self {
        match value {
            DataType::Empty => Self::Empty,
            DataType::Int(i) => Self::Int(*i),
            DataType::Float(f) => Self::Float(*f),
            DataType::Bool(b) => Self::Bool(*b),
            DataType::DateTime(serial) => {
                let millis = ((serial - EXCEL_UNIX_EPOCH_DAYS) * MILLIS_PER_DAY).round() as i64;
                Self::DateTime(millis.saturating_mul(NANOS_PER_MILLI))
            }
            DataType::String(s) if s.is_empty() => Self::Empty,
            DataType::String(s) => Self::Text(s.clone()),
            other => Self::Text(other.to_string()),
        }
    }
}

impl Cell {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
            _ => None,
        }
    }

    fn render(&self) -> Option<String> {
        match self {
            Self::Empty => None,
            Self::Int(i) => Some(i.to_string()),
            Self::Float(f) => Some(f.to_string()),
            Self::Bool(b) => Some(if *b { "True" } else { "False" }.to_string()),
            Self::DateTime(ns) => Some(
                chrono::DateTime::from_timestamp_nanos(*ns)
                    .naive_utc()
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string(),
            ),
            Self::Text(s) => Some(s.clone()),
        }
    }
}

/// Build one typed column from its cells
///
/// Integers stay integers only without gaps; a column of integers with
/// empty cells, or one mixing integers and floats, becomes float. A column
/// with no values at all is float nulls. Anything mixed falls back to text.
fn infer_column(cells: &[Cell]) -> ArrayRef {
    let present: Vec<&Cell> = cells.iter().filter(|c| **c != Cell::Empty).collect();
    let has_gaps = present.len() < cells.len();

    if present.iter().all(|c| matches!(c, Cell::Int(_) | Cell::Float(_))) {
        let integral = present.iter().all(|c| c.as_i64().is_some());
        if integral && !has_gaps && !present.is_empty() {
            return Arc::new(cells.iter().map(Cell::as_i64).collect::<Int64Array>());
        }
        return Arc::new(cells.iter().map(Cell::as_f64).collect::<Float64Array>());
    }
    if present.iter().all(|c| matches!(c, Cell::Bool(_))) {
        let values = cells.iter().map(|c| match c {
            Cell::Bool(b) => Some(*b),
            _ => None,
        });
        return Arc::new(values.collect::<BooleanArray>());
    }
    if present.iter().all(|c| matches!(c, Cell::DateTime(_))) {
        let values = cells.iter().map(|c| match c {
            Cell::DateTime(ns) => Some(*ns),
            _ => None,
        });
        return Arc::new(values.collect::<TimestampNanosecondArray>());
    }
    Arc::new(cells.iter().map(Cell::render).collect::<StringArray>())
}

/// Header names, blanks numbered and repeats suffixed
fn header_names(row: &[DataType], width: usize) -> Vec<String> {
    let mut seen: FxHashMap<String, usize> = FxHashMap::default();
    (0..width)
        .map(|i| {
            let base = row
                .get(i)
                .and_then(|cell| Cell::from(cell).render())
                .unwrap_or_else(|| format!("Unnamed: {i}"));
            let count = seen.entry(base.clone()).or_insert(0);
            let name = if *count == 0 {
                base
            } else {
                format!("{base}.{count}")
            };
            *count += 1;
            name
        })
        .collect()
}

/// Read the first sheet of an `.xlsx` workbook
///
/// # Errors
/// Returns [`Error::Excel`](crate::Error::Excel) if the workbook cannot be
/// read
pub fn read_excel(path: &Path) -> Result<Frame> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range?,
        None => return Ok(Frame::empty()),
    };

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(Frame::empty());
    };
    let width = range.width();
    let names = header_names(header, width);

    let mut cells: Vec<Vec<Cell>> = vec![Vec::new(); width];
    let mut num_rows = 0;
    for row in rows {
        for (col, column) in cells.iter_mut().enumerate() {
            column.push(row.get(col).map_or(Cell::Empty, Cell::from));
        }
        num_rows += 1;
    }

    let columns = names
        .into_iter()
        .zip(cells.iter().map(|c| infer_column(c)))
        .collect();
    let batch = build_batch(columns, num_rows, Default::default())?;
    Ok(Frame::from_batch(batch))
}

/// Target path for a workbook: `dst/<parent folder>/<file stem>.csv`
fn csv_target(item: &Path, dst: &Path) -> PathBuf {
    let parent = item
        .parent()
        .and_then(Path::file_stem)
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = item
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    dst.join(parent).join(format!("{stem}.csv"))
}

/// Convert every `.xlsx` workbook below `src` to CSV under `dst`
///
/// Workbooks are found recursively, hidden ones skipped, and converted in
/// parallel. Each is written as `dst/<parent folder>/<file stem>.csv`, UTF-8
/// with a byte order mark and without index. Existing files are replaced.
///
/// # Returns
/// The written CSV paths, in the order the workbooks were found
///
/// # Errors
/// Returns the first error met reading a workbook or writing a file
pub fn excel_to_csv(src: &Path, dst: &Path) -> Result<Vec<PathBuf>> {
    let start = Instant::now();
    log_operation_start("Converting Excel workbooks in", src);
    std::fs::create_dir_all(dst)?;

    let workbooks = get_paths(src, "**/*.xlsx", false, PathKind::File)?;
    let config = IoConfig {
        csv_bom: true,
        ..IoConfig::default()
    };
    let pb = create_main_progress_bar(workbooks.len() as u64, Some("Converting workbooks"));

    let written = workbooks
        .par_iter()
        .map(|item| {
            let target = csv_target(item, dst);
            let frame = read_excel(item)?;
            create_dir(&target)?;
            write_csv(&frame, &target, Some(false), &config)?;
            log::info!("Converted {} to {}", item.display(), target.display());
            pb.inc(1);
            Ok(target)
        })
        .collect::<Result<Vec<_>>>()?;

    finish_progress_bar(&pb, Some("Conversion complete"));
    log_operation_complete("Converted", src, written.len(), Some(start.elapsed()));
    Ok(written)
}
