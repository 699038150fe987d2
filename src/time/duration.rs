//! Duration values and conversion to seconds

use arrow::array::{
    Array, DurationMicrosecondArray, DurationMillisecondArray, DurationNanosecondArray,
    DurationSecondArray,
};
use arrow::datatypes::{DataType, TimeUnit};
use chrono::TimeDelta;

use crate::error::{Error, Result};
use crate::utils::arrow::downcast_array;

/// A duration in one of the supported representations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationValue {
    /// Standard library duration, always non-negative
    Std(std::time::Duration),
    /// Signed chrono duration
    Chrono(TimeDelta),
    /// Arrow duration scalar: a count of `unit`
    Arrow { value: i64, unit: TimeUnit },
}

impl From<std::time::Duration> for DurationValue {
    fn from(value: std::time::Duration) -> Self {
        Self::Std(value)
    }
}

impl From<TimeDelta> for DurationValue {
    fn from(value: TimeDelta) -> Self {
        Self::Chrono(value)
    }
}

impl DurationValue {
    /// Read one row of an Arrow duration array
    ///
    /// Returns `Ok(None)` for a null row.
    ///
    /// # Errors
    /// Returns [`Error::TypeMismatch`] if the array is not a duration array
    pub fn from_array(array: &dyn Array, row: usize) -> Result<Option<Self>> {
        let DataType::Duration(unit) = array.data_type() else {
            return Err(Error::type_mismatch("duration", array.data_type()));
        };
        if array.is_null(row) {
            return Ok(None);
        }
        let value = match unit {
            TimeUnit::Second => downcast_array::<DurationSecondArray>(array, "Duration(s)")?.value(row),
            TimeUnit::Millisecond => {
                downcast_array::<DurationMillisecondArray>(array, "Duration(ms)")?.value(row)
            }
            TimeUnit::Microsecond => {
                downcast_array::<DurationMicrosecondArray>(array, "Duration(us)")?.value(row)
            }
            TimeUnit::Nanosecond => {
                downcast_array::<DurationNanosecondArray>(array, "Duration(ns)")?.value(row)
            }
        };
        Ok(Some(Self::Arrow { value, unit: *unit }))
    }

    /// Total length in seconds
    #[must_use]
    pub fn total_seconds(&self) -> f64 {
        duration_to_seconds(self)
    }

    /// Total length in nanoseconds, saturating on overflow
    #[must_use]
    pub fn total_nanos(&self) -> i64 {
        match self {
            Self::Std(d) => i64::try_from(d.as_nanos()).unwrap_or(i64::MAX),
            Self::Chrono(d) => d.num_nanoseconds().unwrap_or(if *d < TimeDelta::zero() {
                i64::MIN
            } else {
                i64::MAX
            }),
            Self::Arrow { value, unit } => value.saturating_mul(nanos_per_unit(unit)),
        }
    }
}

const fn nanos_per_unit(unit: &TimeUnit) -> i64 {
    match unit {
        TimeUnit::Second => 1_000_000_000,
        TimeUnit::Millisecond => 1_000_000,
        TimeUnit::Microsecond => 1_000,
        TimeUnit::Nanosecond => 1,
    }
}

/// Total number of seconds in a duration, fractional part included
#[must_use]
pub fn duration_to_seconds(duration: &DurationValue) -> f64 {
    match duration {
        DurationValue::Std(d) => d.as_secs_f64(),
        DurationValue::Chrono(d) => {
            d.num_seconds() as f64 + f64::from(d.subsec_nanos()) / 1_000_000_000.0
        }
        DurationValue::Arrow { value, unit } => match unit {
            TimeUnit::Second => *value as f64,
            TimeUnit::Millisecond => *value as f64 / 1e3,
            TimeUnit::Microsecond => *value as f64 / 1e6,
            TimeUnit::Nanosecond => *value as f64 / 1e9,
        },
    }
}
