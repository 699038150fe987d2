//! Timezone normalization
//!
//! Every supported time shape goes through the same two steps: a naive value
//! is read as UTC, then the result is tagged with the requested zone (or left
//! naive). Since aware values already hold the UTC instant, the second step
//! never changes the stored nanoseconds, only the zone attached to them.
//!
//! The supported shapes form a closed set, see [`TimeValue`]. Tables are
//! handled by the `*_inplace` functions, which replace the index column.

use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, LargeStringArray, StringArray, TimestampNanosecondArray,
};
use arrow::compute::cast;
use arrow::datatypes::{DataType, TimeUnit};

use super::stamp::Timestamp;
use super::zone::Zone;
use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::utils::arrow::downcast_array;

/// A time value in one of the supported shapes
#[derive(Debug, Clone)]
pub enum TimeValue {
    /// A single timestamp
    Scalar(Timestamp),
    /// A single timestamp still to be parsed
    Text(String),
    /// A column or index
    Array(ArrayRef),
}

impl From<Timestamp> for TimeValue {
    fn from(value: Timestamp) -> Self {
        Self::Scalar(value)
    }
}

impl From<&str> for TimeValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<ArrayRef> for TimeValue {
    fn from(value: ArrayRef) -> Self {
        Self::Array(value)
    }
}

impl TimeValue {
    /// The scalar timestamp, if this is a single value
    #[must_use]
    pub const fn as_scalar(&self) -> Option<&Timestamp> {
        match self {
            Self::Scalar(ts) => Some(ts),
            _ => None,
        }
    }

    /// The array, if this is a column
    #[must_use]
    pub const fn as_array(&self) -> Option<&ArrayRef> {
        match self {
            Self::Array(array) => Some(array),
            _ => None,
        }
    }
}

/// Convert a time value to `zone`, or to naive when `zone` is `None`
///
/// | input | result |
/// |---|---|
/// | naive, `Some(z)` | same instant read as UTC, tagged `z` |
/// | naive, `None` | unchanged |
/// | aware, `Some(z)` | same instant in `z` |
/// | aware, `None` | UTC wall-clock, naive |
///
/// # Errors
/// Returns [`Error::UnsupportedType`] for arrays of a non-time type and
/// [`Error::InvalidTimestamp`] for unparseable strings
pub fn to_tz(value: TimeValue, zone: Option<&Zone>) -> Result<TimeValue> {
    match value {
        TimeValue::Scalar(ts) => Ok(TimeValue::Scalar(timestamp_to_tz(ts, zone))),
        TimeValue::Text(s) => Ok(TimeValue::Scalar(timestamp_to_tz(
            Timestamp::parse(&s)?,
            zone,
        ))),
        TimeValue::Array(array) => Ok(TimeValue::Array(array_to_tz(array.as_ref(), zone)?)),
    }
}

/// Convert a time value to UTC
pub fn to_utc(value: TimeValue) -> Result<TimeValue> {
    to_tz(value, Some(&Zone::Utc))
}

/// Convert a time value to naive UTC wall-clock time
pub fn to_naive(value: TimeValue) -> Result<TimeValue> {
    to_tz(value, None)
}

/// Standardize a zone: naive values stay naive, aware values become UTC
pub fn to_std_tz(value: TimeValue) -> Result<TimeValue> {
    match value {
        TimeValue::Scalar(ts) => Ok(TimeValue::Scalar(std_tz(ts))),
        TimeValue::Text(s) => Ok(TimeValue::Scalar(std_tz(Timestamp::parse(&s)?))),
        TimeValue::Array(array) => {
            let array = to_nanosecond_array(array.as_ref())?;
            let zone = array.timezone().map(|_| Zone::Utc);
            Ok(TimeValue::Array(retag(array, zone.as_ref())))
        }
    }
}

/// Naive nanosecond representation of a time value
pub fn to_datetime64(value: TimeValue) -> Result<TimeValue> {
    to_naive(value)
}

fn std_tz(ts: Timestamp) -> Timestamp {
    if ts.is_aware() {
        ts.with_zone(Some(Zone::Utc))
    } else {
        ts
    }
}

/// Convert a single timestamp; never fails since only the zone tag changes
#[must_use]
pub const fn timestamp_to_tz(ts: Timestamp, zone: Option<&Zone>) -> Timestamp {
    match zone {
        Some(zone) => ts.with_zone(Some(*zone)),
        None => ts.with_zone(None),
    }
}

/// Convert a time column to a `Timestamp(Nanosecond, zone)` array
///
/// # Errors
/// Returns [`Error::UnsupportedType`] naming the data type for non-time arrays
pub fn array_to_tz(array: &dyn Array, zone: Option<&Zone>) -> Result<ArrayRef> {
    let nanos = to_nanosecond_array(array)?;
    Ok(retag(nanos, zone))
}

/// Read a time column as nanoseconds, keeping its zone
///
/// Timestamp columns of any unit are rescaled, dates become midnight, and
/// strings are parsed row by row: strings carrying an offset yield their UTC
/// instant and make the result UTC-aware.
///
/// # Errors
/// Returns [`Error::UnsupportedType`] naming the data type for non-time arrays
pub fn to_nanosecond_array(array: &dyn Array) -> Result<TimestampNanosecondArray> {
    match array.data_type() {
        DataType::Timestamp(TimeUnit::Nanosecond, _) => {
            Ok(downcast_array::<TimestampNanosecondArray>(array, "Timestamp(ns)")?.clone())
        }
        DataType::Timestamp(_, tz) => {
            let casted = cast(array, &DataType::Timestamp(TimeUnit::Nanosecond, tz.clone()))?;
            Ok(downcast_array::<TimestampNanosecondArray>(casted.as_ref(), "Timestamp(ns)")?.clone())
        }
        DataType::Date32 | DataType::Date64 => {
            let casted = cast(array, &DataType::Timestamp(TimeUnit::Nanosecond, None))?;
            Ok(downcast_array::<TimestampNanosecondArray>(casted.as_ref(), "Timestamp(ns)")?.clone())
        }
        DataType::Utf8 => {
            let strings = downcast_array::<StringArray>(array, "Utf8")?;
            parse_strings(strings.iter())
        }
        DataType::LargeUtf8 => {
            let strings = downcast_array::<LargeStringArray>(array, "LargeUtf8")?;
            parse_strings(strings.iter())
        }
        other => Err(Error::UnsupportedType(other.to_string())),
    }
}

fn parse_strings<'a>(
    values: impl Iterator<Item = Option<&'a str>>,
) -> Result<TimestampNanosecondArray> {
    let mut aware = false;
    let parsed = values
        .map(|value| {
            value
                .map(|s| {
                    let ts = Timestamp::parse(s)?;
                    aware |= ts.is_aware();
                    Ok(ts.nanos())
                })
                .transpose()
        })
        .collect::<Result<Vec<Option<i64>>>>()?;
    let array = TimestampNanosecondArray::from(parsed);
    Ok(if aware {
        array.with_timezone(Zone::Utc.to_arrow())
    } else {
        array
    })
}

fn retag(array: TimestampNanosecondArray, zone: Option<&Zone>) -> ArrayRef {
    Arc::new(array.with_timezone_opt(zone.map(Zone::to_arrow)))
}

/// Convert the index of a frame to `zone` in place
///
/// # Errors
/// Returns [`Error::TypeMismatch`] if the frame has no designated index and
/// [`Error::UnsupportedType`] if the index is not a time column
pub fn to_tz_inplace(frame: &mut Frame, zone: Option<&Zone>) -> Result<()> {
    let (name, index) = frame
        .index_name()
        .zip(frame.index())
        .map(|(name, index)| (name.to_string(), Arc::clone(index)))
        .ok_or_else(|| Error::type_mismatch("time index", "default range index"))?;
    let converted = array_to_tz(index.as_ref(), zone)?;
    frame.replace_column(&name, converted)
}

/// Convert the index of a frame to UTC in place
pub fn to_utc_inplace(frame: &mut Frame) -> Result<()> {
    to_tz_inplace(frame, Some(&Zone::Utc))
}

/// Convert the index of a frame to naive UTC wall-clock time in place
pub fn to_naive_inplace(frame: &mut Frame) -> Result<()> {
    to_tz_inplace(frame, None)
}

/// Convert the named column or the index to `zone` in place
///
/// # Errors
/// Returns [`Error::KeyNotFound`] if `key` is neither a column nor the index
pub fn df_to_datetime_with_tz(frame: &mut Frame, key: &str, zone: Option<&Zone>) -> Result<()> {
    let array = Arc::clone(frame.key(key)?);
    let converted = array_to_tz(array.as_ref(), zone)?;
    frame.replace_column(key, converted)
}

/// Parse the named column or the index to timestamps in place, keeping zones
///
/// # Errors
/// Returns [`Error::KeyNotFound`] if `key` is neither a column nor the index
pub fn df_to_datetime(frame: &mut Frame, key: &str) -> Result<()> {
    let array = Arc::clone(frame.key(key)?);
    let converted = to_nanosecond_array(array.as_ref())?;
    frame.replace_column(key, Arc::new(converted))
}
