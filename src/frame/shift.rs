//! Shifting values along either axis

use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray, new_null_array};
use arrow::compute::kernels::zip::zip;
use arrow::compute::{CastOptions, cast_with_options};
use itertools::Itertools;

use super::Frame;
use super::ops::index_labels;
use crate::error::{Error, Result};
use crate::utils::arrow::take_optional;

/// Axis a table operation runs along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Axis {
    /// Work on rows, selected by index label
    Index,
    /// Work on columns, selected by name
    #[default]
    Columns,
}

/// Shift values of the named columns or rows by `periods`
///
/// With [`Axis::Columns`] each named column moves down by `periods` rows (up
/// when negative), nulls filling the vacated rows. With [`Axis::Index`] the
/// rows whose index label matches a name have their values moved right by
/// `periods` columns; a moved value is cast to the type of its new column
/// and becomes null when it does not fit.
///
/// A zero shift or an empty `names` returns an unchanged copy, as does a call
/// where nothing matches and `must_include_names` is false.
///
/// # Errors
/// Returns [`Error::KeyNotFound`] when `must_include_names` is set and a name
/// is not in the frame
pub fn shift(
    frame: &Frame,
    names: &[&str],
    periods: i64,
    axis: Axis,
    must_include_names: bool,
) -> Result<Frame> {
    if periods == 0 || names.is_empty() {
        return Ok(frame.clone());
    }

    let labels = match axis {
        Axis::Columns => frame.columns(),
        Axis::Index => index_labels(frame)?,
    };
    let (included, missing): (Vec<&str>, Vec<&str>) = names
        .iter()
        .copied()
        .partition(|name| labels.iter().any(|label| label.as_str() == *name));

    if must_include_names && !missing.is_empty() {
        return Err(Error::key_not_found(missing.iter().unique().join(", ")));
    }
    if included.is_empty() {
        return Ok(frame.clone());
    }

    match axis {
        Axis::Columns => shift_columns(frame, &included, periods),
        Axis::Index => shift_rows(frame, &labels, &included, periods),
    }
}

fn offset(position: usize, periods: i64, len: usize) -> Option<usize> {
    let source = i64::try_from(position).ok()?.checked_sub(periods)?;
    usize::try_from(source).ok().filter(|s| *s < len)
}

fn shift_columns(frame: &Frame, included: &[&str], periods: i64) -> Result<Frame> {
    let num_rows = frame.num_rows();
    let indices: Vec<Option<usize>> = (0..num_rows)
        .map(|row| offset(row, periods, num_rows))
        .collect();

    let columns = frame
        .named_columns()
        .into_iter()
        .map(|(name, array)| {
            let is_target =
                Some(name.as_str()) != frame.index_name() && included.contains(&name.as_str());
            if is_target {
                Ok((name, take_optional(array.as_ref(), &indices)?))
            } else {
                Ok((name, array))
            }
        })
        .collect::<Result<Vec<_>>>()?;
    frame.with_columns(columns, num_rows)
}

fn shift_rows(frame: &Frame, labels: &[String], included: &[&str], periods: i64) -> Result<Frame> {
    let mask: BooleanArray = labels
        .iter()
        .map(|label| Some(included.contains(&label.as_str())))
        .collect();
    let names = frame.columns();
    let originals: Vec<ArrayRef> = names
        .iter()
        .filter_map(|name| frame.column(name).cloned())
        .collect();
    let options = CastOptions {
        safe: true,
        ..CastOptions::default()
    };

    let mut shifted = Vec::with_capacity(originals.len());
    for (j, original) in originals.iter().enumerate() {
        let target_type = original.data_type();
        let source = offset(j, periods, originals.len())
            .and_then(|s| cast_with_options(originals[s].as_ref(), target_type, &options).ok())
            .unwrap_or_else(|| new_null_array(target_type, original.len()));
        shifted.push(zip(&mask, &source, original)?);
    }

    let mut columns = Vec::with_capacity(shifted.len() + 1);
    if let (Some(name), Some(index)) = (frame.index_name(), frame.index()) {
        columns.push((name.to_string(), Arc::clone(index)));
    }
    columns.extend(names.into_iter().zip(shifted));
    frame.with_columns(columns, frame.num_rows())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::arrow::downcast_array;
    use arrow::array::{Array, Float64Array, Int64Array};

    fn sample() -> Frame {
        Frame::from_columns(
            vec![
                ("A", Arc::new(Int64Array::from(vec![1, 2, 3, 4, 5])) as ArrayRef),
                ("B", Arc::new(Int64Array::from(vec![10, 20, 30, 40, 50])) as ArrayRef),
            ],
            None,
        )
        .unwrap()
    }

    fn ints(frame: &Frame, name: &str) -> Vec<Option<i64>> {
        downcast_array::<Int64Array>(frame.column(name).unwrap().as_ref(), "Int64")
            .unwrap()
            .iter()
            .collect()
    }

    #[test]
    fn test_shift_columns_down() {
        let shifted = shift(&sample(), &["A"], 1, Axis::Columns, true).unwrap();
        assert_eq!(ints(&shifted, "A"), vec![None, Some(1), Some(2), Some(3), Some(4)]);
        assert_eq!(ints(&shifted, "B"), vec![Some(10), Some(20), Some(30), Some(40), Some(50)]);

        let up = shift(&sample(), &["B"], -2, Axis::Columns, true).unwrap();
        assert_eq!(ints(&up, "B"), vec![Some(30), Some(40), Some(50), None, None]);
    }

    #[test]
    fn test_shift_rows_across_columns() {
        let shifted = shift(&sample(), &["1"], 1, Axis::Index, true).unwrap();
        assert_eq!(ints(&shifted, "A"), vec![Some(1), None, Some(3), Some(4), Some(5)]);
        assert_eq!(ints(&shifted, "B"), vec![Some(10), Some(2), Some(30), Some(40), Some(50)]);
    }

    #[test]
    fn test_shift_rows_casts_to_target() {
        let frame = Frame::from_columns(
            vec![
                ("x", Arc::new(Int64Array::from(vec![7])) as ArrayRef),
                ("y", Arc::new(Float64Array::from(vec![0.5])) as ArrayRef),
            ],
            None,
        )
        .unwrap();
        let shifted = shift(&frame, &["0"], 1, Axis::Index, true).unwrap();
        let y = shifted.column("y").unwrap();
        let y = downcast_array::<Float64Array>(y.as_ref(), "Float64").unwrap();
        assert_eq!(y.value(0), 7.0);
        assert!(shifted.column("x").unwrap().is_null(0));
    }

    #[test]
    fn test_missing_names() {
        let frame = sample();
        assert!(matches!(
            shift(&frame, &["A", "Z"], 1, Axis::Columns, true),
            Err(Error::KeyNotFound { .. })
        ));
        let copy = shift(&frame, &["Z"], 1, Axis::Columns, false).unwrap();
        assert_eq!(ints(&copy, "A"), ints(&frame, "A"));

        let unchanged = shift(&frame, &["A"], 0, Axis::Columns, true).unwrap();
        assert_eq!(ints(&unchanged, "A"), ints(&frame, "A"));
    }
}
