//! Index management and small table helpers
//!
//! These operate on a [`Frame`] in place, mirroring how the index is treated
//! throughout the crate: a designated column kept at the front of the batch.

use std::sync::Arc;

use arrow::array::{ArrayRef, Int64Array};
use log::debug;

use super::Frame;
use super::shift::Axis;
use crate::error::Result;
use crate::time::{Zone, to_tz_inplace};
use crate::utils::arrow::{array_to_strings, missing_mask};

/// Name given to the positional index when it is materialized as a column
pub const DEFAULT_INDEX_NAME: &str = "index";

/// Whether the frame uses the implicit positional index `0..num_rows`
#[must_use]
pub const fn is_default_index(frame: &Frame) -> bool {
    frame.index.is_none()
}

/// Designate `key` as the index
///
/// A previous index is discarded. Returns `true` if `key` is now the index,
/// `false` if it is neither a column nor the current index.
pub fn set_index(frame: &mut Frame, key: &str) -> Result<bool> {
    if frame.index_name() == Some(key) {
        return Ok(true);
    }
    if !frame.has_column(key) {
        return Ok(false);
    }
    if let Some(old) = frame.index_name().map(str::to_string) {
        debug!("Replacing index '{old}' with '{key}'");
        let columns = frame
            .named_columns()
            .into_iter()
            .filter(|(name, _)| *name != old)
            .collect();
        *frame = frame.with_columns(columns, frame.num_rows())?;
        frame.clear_index();
    }
    frame.promote_index(key)?;
    Ok(true)
}

/// Designate `key` as the index and convert it to `zone`
///
/// Returns whether `key` could be made the index; the zone conversion only
/// runs when it could.
pub fn set_timeidx(frame: &mut Frame, key: &str, zone: Option<&Zone>) -> Result<bool> {
    let found = set_index(frame, key)?;
    if found {
        to_tz_inplace(frame, zone)?;
    }
    Ok(found)
}

/// Turn the index back into a regular column
///
/// A frame with the positional index gets it materialized as an `index`
/// column holding `0..num_rows`.
pub fn reset_index(frame: &mut Frame) -> Result<()> {
    if frame.index_name().is_some() {
        frame.clear_index();
        return Ok(());
    }
    let num_rows = frame.num_rows();
    let positions: ArrayRef = Arc::new(Int64Array::from_iter_values(0..num_rows as i64));
    let mut columns = vec![(DEFAULT_INDEX_NAME.to_string(), positions)];
    columns.extend(frame.named_columns());
    *frame = frame.with_columns(columns, num_rows)?;
    Ok(())
}

/// Rename columns in place, the index included
///
/// Names that are not in the frame are ignored.
pub fn rename(frame: &mut Frame, mapping: &[(&str, &str)]) -> Result<()> {
    let lookup = |name: &str| {
        mapping
            .iter()
            .find(|(old, _)| *old == name)
            .map_or_else(|| name.to_string(), |(_, new)| (*new).to_string())
    };
    let index = frame.index_name().map(lookup);
    let columns = frame
        .named_columns()
        .into_iter()
        .map(|(name, array)| (lookup(&name), array))
        .collect();
    let mut renamed = frame.with_columns(columns, frame.num_rows())?;
    renamed.clear_index();
    if let Some(index) = index {
        renamed.promote_index(&index)?;
    }
    *frame = renamed;
    Ok(())
}

/// Count missing values (nulls, and NaN in float columns)
///
/// With [`Axis::Columns`] the counts are per column; with [`Axis::Index`]
/// they are per row, labelled by the rendered index value. Only non-zero
/// counts are reported, in frame order.
pub fn sum_none(frame: &Frame, axis: Axis) -> Result<Vec<(String, usize)>> {
    if frame.is_empty() {
        return Ok(Vec::new());
    }
    let masks: Vec<(String, Vec<bool>)> = frame
        .columns()
        .into_iter()
        .filter_map(|name| {
            let mask = missing_mask(frame.column(&name)?.as_ref());
            Some((name, mask))
        })
        .collect();

    match axis {
        Axis::Columns => Ok(masks
            .into_iter()
            .map(|(name, mask)| (name, mask.iter().filter(|m| **m).count()))
            .filter(|(_, count)| *count > 0)
            .collect()),
        Axis::Index => {
            let labels = index_labels(frame)?;
            Ok(labels
                .into_iter()
                .enumerate()
                .map(|(row, label)| (label, masks.iter().filter(|(_, mask)| mask[row]).count()))
                .filter(|(_, count)| *count > 0)
                .collect())
        }
    }
}

/// Rendered index value of every row, positions for the default index
pub(crate) fn index_labels(frame: &Frame) -> Result<Vec<String>> {
    match frame.index() {
        Some(index) => Ok(array_to_strings(index.as_ref())?
            .into_iter()
            .map(Option::unwrap_or_default)
            .collect()),
        None => Ok((0..frame.num_rows()).map(|row| row.to_string()).collect()),
    }
}
