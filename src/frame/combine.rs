//! Combining two frames on a shared time key

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, TimestampNanosecondArray};
use arrow::compute::kernels::zip::zip;
use arrow::compute::{CastOptions, cast_with_options, is_not_null};
use arrow::datatypes::DataType;
use log::debug;
use rustc_hash::FxHashMap;

use super::Frame;
use super::ops::{reset_index as restore_key_column, set_timeidx};
use crate::error::{Error, Result};
use crate::time::Zone;
use crate::time::convert::to_nanosecond_array;
use crate::utils::arrow::{build_batch, take_optional};

/// Combine two frames on the time column `key`, preferring `df1`
///
/// Both inputs are given a UTC time index on `key` while combining and get
/// `key` back as a regular column afterwards, failed or not, so the caller
/// sees them converted to UTC. The result holds the sorted union of timestamps and the
/// columns of `df1` followed by those only `df2` has. Values come from `df1`
/// and gaps are filled from `df2`, cast to the `df1` column type. Rows whose
/// key is null are dropped.
///
/// # Arguments
/// * `key` - Name of the time column shared by both frames
/// * `df1` - Frame whose values win
/// * `df2` - Frame filling the gaps
/// * `reset_index` - Keep `key` as the index of the result; when false it is
///   returned as a regular column
///
/// # Returns
/// The combined frame, or an empty frame when either input lacks `key`
///
/// # Errors
/// Returns [`Error::DuplicateIndex`] if a timestamp repeats within one input,
/// or a conversion error if `key` does not hold times
pub fn combine_first_by_time(
    key: &str,
    df1: &mut Frame,
    df2: &mut Frame,
    reset_index: bool,
) -> Result<Frame> {
    if df1.key(key).is_err() || df2.key(key).is_err() {
        debug!("'{key}' missing from one of the frames, nothing to combine");
        return Ok(Frame::empty());
    }

    let combined = set_timeidx(df1, key, Some(&Zone::Utc))
        .and_then(|_| set_timeidx(df2, key, Some(&Zone::Utc)))
        .and_then(|_| combine_on_index(key, df1, df2));
    restore_key(df1, key)?;
    restore_key(df2, key)?;

    let mut combined = combined?;
    if !reset_index {
        restore_key_column(&mut combined)?;
    }
    Ok(combined)
}

/// Give `key` back as a column if it is the index
fn restore_key(frame: &mut Frame, key: &str) -> Result<()> {
    if frame.index_name() == Some(key) {
        restore_key_column(frame)?;
    }
    Ok(())
}

fn positions(stamps: &TimestampNanosecondArray) -> Result<FxHashMap<i64, usize>> {
    let mut map = FxHashMap::default();
    for (row, value) in stamps.iter().enumerate() {
        if let Some(value) = value {
            if map.insert(value, row).is_some() {
                return Err(Error::DuplicateIndex(value.to_string()));
            }
        }
    }
    Ok(map)
}

fn combine_on_index(key: &str, df1: &Frame, df2: &Frame) -> Result<Frame> {
    let stamps1 = to_nanosecond_array(df1.key(key)?.as_ref())?;
    let stamps2 = to_nanosecond_array(df2.key(key)?.as_ref())?;
    let (pos1, pos2) = (positions(&stamps1)?, positions(&stamps2)?);

    let union: BTreeSet<i64> = pos1.keys().chain(pos2.keys()).copied().collect();
    let rows1: Vec<Option<usize>> = union.iter().map(|t| pos1.get(t).copied()).collect();
    let rows2: Vec<Option<usize>> = union.iter().map(|t| pos2.get(t).copied()).collect();
    let num_rows = union.len();

    let index = TimestampNanosecondArray::from_iter_values(union).with_timezone(Zone::Utc.to_arrow());
    let mut columns: Vec<(String, ArrayRef)> = vec![(key.to_string(), Arc::new(index))];

    let options = CastOptions {
        safe: true,
        ..CastOptions::default()
    };
    for name in df1.columns() {
        let Some(first) = df1.column(&name) else { continue };
        let first = take_optional(first.as_ref(), &rows1)?;
        let merged = match df2.column(&name) {
            None => first,
            Some(second) => {
                let second = take_optional(second.as_ref(), &rows2)?;
                if first.data_type() == &DataType::Null {
                    second
                } else {
                    let second = cast_with_options(second.as_ref(), first.data_type(), &options)?;
                    zip(&is_not_null(first.as_ref())?, &first, &second)?
                }
            }
        };
        columns.push((name, merged));
    }
    for name in df2.columns() {
        if df1.has_column(&name) {
            continue;
        }
        if let Some(second) = df2.column(&name) {
            columns.push((name, take_optional(second.as_ref(), &rows2)?));
        }
    }

    debug!(
        "Combined {} and {} rows on '{key}' into {num_rows}",
        df1.num_rows(),
        df2.num_rows()
    );
    let batch = build_batch(columns, num_rows, HashMap::new())?;
    Frame::new(batch, Some(key))
}
