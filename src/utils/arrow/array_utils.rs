//! Utilities for working with Arrow arrays.
//!
//! Downcasting with readable errors, null-aware gathers and a few type
//! predicates shared by the time and frame modules.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, UInt32Array, new_null_array};
use arrow::compute::take;
use arrow::datatypes::{DataType, Field, FieldRef, Schema};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};

use crate::error::{Error, Result};

/// Downcast an array to a concrete type with a clear error message
///
/// # Arguments
/// * `array` - The array to downcast
/// * `expected` - Human-readable name of the expected type
///
/// # Returns
/// The downcast array reference
pub fn downcast_array<'a, A: Array + 'static>(array: &'a dyn Array, expected: &str) -> Result<&'a A> {
    array
        .as_any()
        .downcast_ref::<A>()
        .ok_or_else(|| Error::type_mismatch(expected, array.data_type()))
}

/// Whether the data type is a timestamp or date
#[must_use]
pub const fn is_temporal(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::Timestamp(_, _) | DataType::Date32 | DataType::Date64
    )
}

/// Whether the data type is numeric
#[must_use]
pub const fn is_numeric(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float16
            | DataType::Float32
            | DataType::Float64
    )
}

/// Gather rows by position, `None` producing a null row
///
/// # Arguments
/// * `array` - Source array
/// * `indices` - Source row for every output row
///
/// # Returns
/// A new array of the same type with `indices.len()` rows
pub fn take_optional(array: &dyn Array, indices: &[Option<usize>]) -> Result<ArrayRef> {
    if array.is_empty() {
        return Ok(new_null_array(array.data_type(), indices.len()));
    }
    let indices: UInt32Array = indices
        .iter()
        .map(|i| i.and_then(|i| u32::try_from(i).ok()))
        .collect();
    Ok(take(array, &indices, None)?)
}

/// Build a record batch from named columns
///
/// The row count is explicit so that a batch without columns keeps its rows.
/// All fields are nullable.
pub fn build_batch(
    columns: Vec<(String, ArrayRef)>,
    num_rows: usize,
    metadata: std::collections::HashMap<String, String>,
) -> Result<RecordBatch> {
    let (fields, arrays): (Vec<FieldRef>, Vec<ArrayRef>) = columns
        .into_iter()
        .map(|(name, array)| {
            let field = Arc::new(Field::new(name, array.data_type().clone(), true));
            (field, array)
        })
        .unzip();
    let schema = Arc::new(Schema::new_with_metadata(fields, metadata));
    let options = RecordBatchOptions::new().with_row_count(Some(num_rows));
    Ok(RecordBatch::try_new_with_options(schema, arrays, &options)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Float64Array, Int64Array};

    #[test]
    fn test_take_optional_inserts_nulls() {
        let array = Int64Array::from(vec![10, 20, 30]);
        let taken = take_optional(&array, &[Some(2), None, Some(0)]).unwrap();
        let taken = downcast_array::<Int64Array>(taken.as_ref(), "Int64").unwrap();
        assert_eq!(taken.value(0), 30);
        assert!(taken.is_null(1));
        assert_eq!(taken.value(2), 10);
    }

    #[test]
    fn test_take_optional_from_empty() {
        let array = Float64Array::from(Vec::<f64>::new());
        let taken = take_optional(&array, &[None, None]).unwrap();
        assert_eq!(taken.len(), 2);
        assert_eq!(taken.null_count(), 2);
    }

    #[test]
    fn test_downcast_error_names_types() {
        let array = Int64Array::from(vec![1]);
        let err = downcast_array::<Float64Array>(&array, "Float64").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Type mismatch: expected Float64, found Int64"
        );
    }

    #[test]
    fn test_build_batch_without_columns() {
        let batch = build_batch(Vec::new(), 4, Default::default()).unwrap();
        assert_eq!(batch.num_rows(), 4);
        assert_eq!(batch.num_columns(), 0);
    }
}
