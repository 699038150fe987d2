//! Value extraction from Arrow arrays
//!
//! Row-level accessors used where a column has to be read as plain Rust values:
//! labels for matching, floats for aggregation.

use arrow::array::{Array, Float64Array};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use arrow::util::display::{ArrayFormatter, FormatOptions};

use super::array_utils::{downcast_array, is_numeric};
use crate::error::{Error, Result};

/// Render every row of an array as a string, nulls as `None`
///
/// # Arguments
/// * `array` - The Arrow array
///
/// # Returns
/// One entry per row
pub fn array_to_strings(array: &dyn Array) -> Result<Vec<Option<String>>> {
    let options = FormatOptions::default();
    let formatter = ArrayFormatter::try_new(array, &options)?;
    Ok((0..array.len())
        .map(|row| {
            if array.is_null(row) {
                None
            } else {
                Some(formatter.value(row).to_string())
            }
        })
        .collect())
}

/// Read a numeric or boolean array as `f64`, nulls as `None`
///
/// NaN values are kept as NaN.
///
/// # Errors
/// Returns [`Error::TypeMismatch`] for non-numeric arrays
pub fn array_to_f64(array: &dyn Array) -> Result<Vec<Option<f64>>> {
    let data_type = array.data_type();
    if !is_numeric(data_type) && *data_type != DataType::Boolean {
        return Err(Error::type_mismatch("numeric column", data_type));
    }
    let casted = cast(array, &DataType::Float64)?;
    let floats = downcast_array::<Float64Array>(casted.as_ref(), "Float64")?;
    Ok(floats.iter().collect())
}

/// Count missing values: nulls, plus NaN for float columns
#[must_use]
pub fn missing_mask(array: &dyn Array) -> Vec<bool> {
    let nan_mask = match array.data_type() {
        DataType::Float16 | DataType::Float32 | DataType::Float64 => array_to_f64(array).ok(),
        _ => None,
    };
    match nan_mask {
        Some(values) => values
            .iter()
            .map(|v| v.is_none_or(f64::is_nan))
            .collect(),
        None => (0..array.len()).map(|row| array.is_null(row)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Float32Array, Int32Array, StringArray};

    #[test]
    fn test_array_to_strings() {
        let array = Int32Array::from(vec![Some(1), None, Some(3)]);
        assert_eq!(
            array_to_strings(&array).unwrap(),
            vec![Some("1".to_string()), None, Some("3".to_string())]
        );
    }

    #[test]
    fn test_array_to_f64_rejects_strings() {
        let array = StringArray::from(vec!["a"]);
        assert!(matches!(
            array_to_f64(&array),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_missing_mask_counts_nan() {
        let array = Float32Array::from(vec![Some(1.0), Some(f32::NAN), None]);
        assert_eq!(missing_mask(&array), vec![false, true, true]);
    }
}
