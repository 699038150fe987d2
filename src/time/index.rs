//! Time-index completion
//!
//! Builds the evenly spaced sequence between the first and last timestamp of
//! an index and reindexes tables onto it. Gaps become all-null rows; rows
//! whose timestamp is off the grid are dropped.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, TimestampNanosecondArray};
use chrono::NaiveTime;
use rustc_hash::FxHashMap;

use super::convert::to_nanosecond_array;
use super::frequency::Frequency;
use super::stamp::{NANOS_PER_DAY, Timestamp};
use super::zone::Zone;
use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::utils::arrow::{is_temporal, take_optional};

/// Evenly spaced timestamps from `start` to `end` inclusive
///
/// The zone of `start` is kept. With `normalize`, both ends are first floored
/// to midnight in that zone. The result has `floor((end - start) / freq) + 1`
/// rows, or none when `end` precedes `start`.
///
/// # Errors
/// Returns [`Error::InvalidTimestamp`] if a normalized midnight does not exist
/// in the zone, or a point falls outside the nanosecond range
pub fn date_range(
    start: Timestamp,
    end: Timestamp,
    freq: Frequency,
    normalize: bool,
) -> Result<TimestampNanosecondArray> {
    let zone = start.zone();
    let (first, last) = if normalize {
        (floor_to_midnight(&start)?, floor_to_midnight(&end)?)
    } else {
        (start.nanos(), end.nanos())
    };

    let values: Vec<i64> = if last < first {
        Vec::new()
    } else {
        let step = i128::from(freq.nanos());
        let steps = (i128::from(last) - i128::from(first)) / step;
        (0..=steps)
            .map(|k| {
                i64::try_from(i128::from(first) + k * step)
                    .map_err(|_| Error::InvalidTimestamp(format!("{first} + {k} * {freq}")))
            })
            .collect::<Result<_>>()?
    };

    let array = TimestampNanosecondArray::from(values);
    Ok(array.with_timezone_opt(zone.map(|z| z.to_arrow())))
}

/// Midnight of the day of `ts`, local to its zone
pub(crate) fn floor_to_midnight(ts: &Timestamp) -> Result<i64> {
    match ts.zone() {
        None => Ok(ts.nanos() - ts.nanos().rem_euclid(NANOS_PER_DAY)),
        Some(zone) => {
            let midnight = ts.naive_local().date().and_time(NaiveTime::MIN);
            let utc = zone
                .utc_from_local(&midnight)
                .ok_or_else(|| Error::InvalidTimestamp(format!("{midnight} in {zone}")))?;
            Ok(Timestamp::from_naive(&utc)?.nanos())
        }
    }
}

/// Zone of a nanosecond timestamp array
pub(crate) fn array_zone(array: &TimestampNanosecondArray) -> Result<Option<Zone>> {
    array.timezone().map(Zone::parse).transpose()
}

/// Complete a time column to an evenly spaced sequence from its min to its max
///
/// Nulls are ignored; a column without values yields an empty sequence.
///
/// # Errors
/// Returns [`Error::UnsupportedType`] if the column is not a time column
pub fn complete_time_array(
    array: &dyn Array,
    freq: Frequency,
    normalize: bool,
) -> Result<TimestampNanosecondArray> {
    let nanos = to_nanosecond_array(array)?;
    let zone = array_zone(&nanos)?;
    let (min, max) = nanos
        .iter()
        .flatten()
        .fold(None, |acc: Option<(i64, i64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
        .unwrap_or((0, -1));
    if max < min {
        return Ok(TimestampNanosecondArray::from(Vec::<i64>::new())
            .with_timezone_opt(zone.map(|z| z.to_arrow())));
    }
    date_range(
        Timestamp::from_nanos(min, zone),
        Timestamp::from_nanos(max, zone),
        freq,
        normalize,
    )
}

/// Reindex a frame onto the completed sequence of its time index
///
/// # Errors
/// Returns [`Error::TypeMismatch`] if the frame has no temporal index and
/// [`Error::DuplicateIndex`] if the index holds a timestamp twice
pub fn complete_timeindex(frame: &Frame, freq: Frequency, normalize: bool) -> Result<Frame> {
    let (name, index) = match (frame.index_name(), frame.index()) {
        (Some(name), Some(index)) if is_temporal(index.data_type()) => (name.to_string(), index),
        (_, Some(index)) => return Err(Error::type_mismatch("time index", index.data_type())),
        _ => return Err(Error::type_mismatch("time index", "default range index")),
    };

    let current = to_nanosecond_array(index.as_ref())?;
    let mut positions: FxHashMap<i64, usize> = FxHashMap::default();
    for (row, value) in current.iter().enumerate() {
        if let Some(value) = value {
            if positions.insert(value, row).is_some() {
                return Err(Error::DuplicateIndex(
                    Timestamp::from_nanos(value, array_zone(&current)?).to_string(),
                ));
            }
        }
    }

    let completed = complete_time_array(&current, freq, normalize)?;
    let take: Vec<Option<usize>> = completed
        .values()
        .iter()
        .map(|v| positions.get(v).copied())
        .collect();
    let num_rows = take.len();

    let mut columns = vec![(name, Arc::new(completed) as ArrayRef)];
    for column in frame.columns() {
        let array = frame.key(&column)?;
        columns.push((column, take_optional(array.as_ref(), &take)?));
    }
    frame.with_columns(columns, num_rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{DataType, TimeUnit};

    const HOUR: i64 = 3_600_000_000_000;

    fn hourly_frame(hours: &[i64], tz: Option<&str>) -> Frame {
        let times = TimestampNanosecondArray::from(hours.iter().map(|h| h * HOUR).collect::<Vec<_>>())
            .with_timezone_opt(tz.map(Arc::<str>::from));
        let values = Float64Array::from(hours.iter().map(|h| *h as f64).collect::<Vec<_>>());
        Frame::from_columns(
            vec![
                ("time", Arc::new(times) as ArrayRef),
                ("value", Arc::new(values) as ArrayRef),
            ],
            Some("time"),
        )
        .unwrap()
    }

    #[test]
    fn test_date_range_counts() {
        let freq = Frequency::parse("1h").unwrap();
        let start = Timestamp::from_nanos(0, None);
        let end = Timestamp::from_nanos(5 * HOUR + 1, None);
        assert_eq!(date_range(start, end, freq, false).unwrap().len(), 6);
        assert_eq!(date_range(end, start, freq, false).unwrap().len(), 0);
    }

    #[test]
    fn test_date_range_spans_full_nanosecond_range() {
        let freq = Frequency::from_nanos(1 << 62).unwrap();
        let start = Timestamp::from_nanos(i64::MIN + 1, None);
        let end = Timestamp::from_nanos(i64::MAX, None);
        let range = date_range(start, end, freq, false).unwrap();
        assert_eq!(range.len(), 4);
        assert_eq!(range.value(3), (1_i64 << 62) + 1);
        assert_eq!(range.null_count(), 0);
    }

    #[test]
    fn test_date_range_normalize_in_zone() {
        let zone = Zone::parse("+08:00").unwrap();
        // 1970-01-01 10:00 local
        let start = Timestamp::from_nanos(2 * HOUR, Some(zone));
        let end = Timestamp::from_nanos(26 * HOUR, Some(zone));
        let range = date_range(start, end, Frequency::parse("1D").unwrap(), true).unwrap();
        assert_eq!(range.len(), 2);
        assert_eq!(range.value(0), -8 * HOUR);
        assert_eq!(range.timezone(), Some("+08:00"));
    }

    #[test]
    fn test_complete_inserts_null_rows() {
        let frame = hourly_frame(&[0, 2], Some("UTC"));
        let completed = complete_timeindex(&frame, Frequency::parse("h").unwrap(), false).unwrap();
        assert_eq!(completed.num_rows(), 3);
        assert_eq!(completed.index_name(), Some("time"));
        assert_eq!(
            completed.index().unwrap().data_type(),
            &DataType::Timestamp(TimeUnit::Nanosecond, Some("UTC".into()))
        );
        let values = completed.column("value").unwrap();
        assert!(values.is_valid(0));
        assert!(values.is_null(1));
        assert!(values.is_valid(2));
    }

    #[test]
    fn test_off_grid_rows_dropped() {
        let mut frame = hourly_frame(&[0, 4], None);
        let odd = TimestampNanosecondArray::from(vec![0, HOUR + 1]);
        frame.replace_column("time", Arc::new(odd)).unwrap();
        let completed = complete_timeindex(&frame, Frequency::parse("30min").unwrap(), false).unwrap();
        assert_eq!(completed.num_rows(), 3);
        assert_eq!(completed.column("value").unwrap().null_count(), 2);
    }

    #[test]
    fn test_errors() {
        let frame = hourly_frame(&[0, 0], None);
        assert!(matches!(
            complete_timeindex(&frame, Frequency::parse("h").unwrap(), false),
            Err(Error::DuplicateIndex(_))
        ));

        let plain = Frame::from_columns(
            vec![("a", Arc::new(Int64Array::from(vec![1])) as ArrayRef)],
            None,
        )
        .unwrap();
        assert!(matches!(
            complete_timeindex(&plain, Frequency::parse("h").unwrap(), false),
            Err(Error::TypeMismatch { .. })
        ));

        let labels = Frame::from_columns(
            vec![("k", Arc::new(StringArray::from(vec!["x"])) as ArrayRef)],
            Some("k"),
        )
        .unwrap();
        assert!(matches!(
            complete_timeindex(&labels, Frequency::parse("h").unwrap(), false),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_complete_array_ignores_nulls() {
        let array = TimestampNanosecondArray::from(vec![Some(0), None, Some(2 * HOUR)]);
        let completed = complete_time_array(&array, Frequency::parse("h").unwrap(), false).unwrap();
        assert_eq!(completed.len(), 3);
        assert_eq!(completed.null_count(), 0);
    }
}
