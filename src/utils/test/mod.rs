//! Comparison helpers for tests
//!
//! Floats compare NaN-aware: two NaNs are equal. Scalars use a closeness
//! tolerance, arrays compare exactly.

use std::time::{Duration, Instant};

use arrow::array::Array;
use arrow::datatypes::DataType;

use crate::frame::Frame;
use crate::utils::arrow::array_to_f64;

/// Relative tolerance of [`equal_f64`]
pub const RTOL: f64 = 1e-5;
/// Absolute tolerance of [`equal_f64`]
pub const ATOL: f64 = 1e-8;

/// Whether two floats are close, treating NaN as equal to NaN
#[must_use]
pub fn equal_f64(a: f64, b: f64) -> bool {
    if a.is_nan() || b.is_nan() {
        return a.is_nan() && b.is_nan();
    }
    if a.is_infinite() || b.is_infinite() {
        return a == b;
    }
    (a - b).abs() <= RTOL.mul_add(b.abs(), ATOL)
}

/// Whether two arrays hold the same values
///
/// Types and lengths must match. Float arrays treat NaN as equal to NaN.
#[must_use]
pub fn arrays_equal(a: &dyn Array, b: &dyn Array) -> bool {
    if a.data_type() != b.data_type() || a.len() != b.len() {
        return false;
    }
    match a.data_type() {
        DataType::Float16 | DataType::Float32 | DataType::Float64 => {
            match (array_to_f64(a), array_to_f64(b)) {
                (Ok(left), Ok(right)) => left.iter().zip(&right).all(|pair| match pair {
                    (Some(x), Some(y)) => x == y || (x.is_nan() && y.is_nan()),
                    (None, None) => true,
                    _ => false,
                }),
                _ => false,
            }
        }
        _ => a.to_data() == b.to_data(),
    }
}

/// Whether two frames have the same index, columns and values
#[must_use]
pub fn frames_equal(a: &Frame, b: &Frame) -> bool {
    a.index_name() == b.index_name()
        && a.num_rows() == b.num_rows()
        && a.schema().fields().len() == b.schema().fields().len()
        && a
            .batch()
            .schema()
            .fields()
            .iter()
            .zip(b.batch().schema().fields())
            .all(|(x, y)| x.name() == y.name())
        && a
            .batch()
            .columns()
            .iter()
            .zip(b.batch().columns())
            .all(|(x, y)| arrays_equal(x.as_ref(), y.as_ref()))
}

/// Run `func` and report how long it took
pub fn timed<T>(func: impl FnOnce() -> T) -> (Duration, T) {
    let start = Instant::now();
    let result = func();
    (start.elapsed(), result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{ArrayRef, Float64Array, Int64Array};
    use std::sync::Arc;

    #[test]
    fn test_equal_f64() {
        assert!(equal_f64(f64::NAN, f64::NAN));
        assert!(!equal_f64(f64::NAN, 1.0));
        assert!(equal_f64(1.0, 1.0 + 1e-9));
        assert!(!equal_f64(1.0, 1.001));
        assert!(equal_f64(f64::INFINITY, f64::INFINITY));
    }

    #[test]
    fn test_arrays_equal() {
        let a = Float64Array::from(vec![Some(1.0), Some(f64::NAN), None]);
        let b = Float64Array::from(vec![Some(1.0), Some(f64::NAN), None]);
        assert!(arrays_equal(&a, &b));
        let c = Float64Array::from(vec![Some(1.0), None, None]);
        assert!(!arrays_equal(&a, &c));
        assert!(!arrays_equal(&a, &Int64Array::from(vec![1, 2, 3])));
        assert!(arrays_equal(
            &Int64Array::from(vec![1, 2]),
            &Int64Array::from(vec![1, 2])
        ));
    }

    #[test]
    fn test_frames_equal() {
        let make = |v: i64| {
            Frame::from_columns(
                vec![("a", Arc::new(Int64Array::from(vec![v])) as ArrayRef)],
                None,
            )
            .unwrap()
        };
        assert!(frames_equal(&make(1), &make(1)));
        assert!(!frames_equal(&make(1), &make(2)));
        let (_, value) = timed(|| 2 + 2);
        assert_eq!(value, 4);
    }
}
