//! Time-bin resampling
//!
//! Rows are grouped into bins of a fixed [`Frequency`] counted from midnight
//! of the first day in the index, local to the index zone. Each bin is
//! labelled by its left edge. Every bin from the first to the last occupied
//! one is present in the output.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, TimestampNanosecondArray, new_null_array};
use log::debug;

use super::Frame;
use crate::error::{Error, Result};
use crate::time::convert::to_nanosecond_array;
use crate::time::index::{array_zone, floor_to_midnight};
use crate::time::{Frequency, Timestamp};
use crate::utils::arrow::{array_to_f64, is_temporal, take_optional};

/// Reducer applied to the values of a column within one bin
type CustomReducer = dyn Fn(&[f64]) -> Option<f64> + Send + Sync;

/// How a column is reduced within a bin
#[derive(Clone)]
pub enum Aggregation {
    /// First non-null value, original type kept
    First,
    /// Last non-null value, original type kept
    Last,
    Mean,
    Max,
    Min,
    /// Sum of the values; an empty bin sums to 0
    Sum,
    /// Caller-supplied reducer over the non-missing values of the bin
    Custom(Arc<CustomReducer>),
}

impl Aggregation {
    /// Wrap a closure as a custom aggregation
    pub fn custom(f: impl Fn(&[f64]) -> Option<f64> + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(f))
    }

    /// Reduce the non-missing values of a bin
    fn reduce(&self, values: &[f64]) -> Option<f64> {
        match self {
            Self::Sum => Some(values.iter().sum()),
            Self::Custom(f) => f(values),
            _ if values.is_empty() => None,
            Self::Mean => Some(values.iter().sum::<f64>() / values.len() as f64),
            Self::Max => Some(values.iter().copied().fold(f64::NEG_INFINITY, f64::max)),
            Self::Min => Some(values.iter().copied().fold(f64::INFINITY, f64::min)),
            Self::First => values.first().copied(),
            Self::Last => values.last().copied(),
        }
    }
}

impl fmt::Debug for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::First => f.write_str("First"),
            Self::Last => f.write_str("Last"),
            Self::Mean => f.write_str("Mean"),
            Self::Max => f.write_str("Max"),
            Self::Min => f.write_str("Min"),
            Self::Sum => f.write_str("Sum"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl FromStr for Aggregation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "first" => Ok(Self::First),
            "last" => Ok(Self::Last),
            "mean" => Ok(Self::Mean),
            "max" => Ok(Self::Max),
            "min" => Ok(Self::Min),
            "sum" => Ok(Self::Sum),
            other => Err(Error::type_mismatch(
                "one of first, last, mean, max, min, sum",
                other,
            )),
        }
    }
}

/// Resample a frame on its time index
///
/// Each rule applies an [`Aggregation`] to the named columns. Numeric
/// aggregations produce `Float64` columns; `First` and `Last` keep the column
/// type. Columns without a rule come back all-null. Empty bins are null,
/// except for `Sum`.
///
/// # Errors
/// Returns [`Error::TypeMismatch`] if the index is not temporal or a numeric
/// aggregation targets a non-numeric column, [`Error::KeyNotFound`] if a
/// rule names an unknown column, and [`Error::InvalidTimestamp`] if the
/// first midnight does not exist in the index zone
pub fn resample(
    frame: &Frame,
    freq: Frequency,
    rules: &[(&[&str], Aggregation)],
) -> Result<Frame> {
    let (name, index) = match (frame.index_name(), frame.index()) {
        (Some(name), Some(index)) if is_temporal(index.data_type()) => (name.to_string(), index),
        (_, Some(index)) => return Err(Error::type_mismatch("time index", index.data_type())),
        _ => return Err(Error::type_mismatch("time index", "default range index")),
    };
    for (columns, _) in rules {
        if let Some(missing) = columns.iter().find(|c| !frame.has_column(c)) {
            return Err(Error::key_not_found(*missing));
        }
    }

    let stamps = to_nanosecond_array(index.as_ref())?;
    let step = freq.nanos();
    let origin = match stamps.iter().flatten().min() {
        Some(min) => floor_to_midnight(&Timestamp::from_nanos(min, array_zone(&stamps)?))?,
        None => 0,
    };
    let bin_of = |v: i64| v - (v - origin).rem_euclid(step);

    let occupied: Vec<(usize, i64)> = stamps
        .iter()
        .enumerate()
        .filter_map(|(row, v)| v.map(|v| (row, bin_of(v))))
        .collect();
    let (first_bin, last_bin) = occupied
        .iter()
        .fold((i64::MAX, i64::MIN), |(lo, hi), (_, b)| (lo.min(*b), hi.max(*b)));
    let num_bins = if occupied.is_empty() {
        0
    } else {
        usize::try_from((last_bin - first_bin) / step + 1)
            .map_err(|_| Error::InvalidFrequency(freq.to_string()))?
    };

    let mut groups: Vec<Vec<usize>> = vec![Vec::new(); num_bins];
    for (row, bin) in &occupied {
        // bins are whole multiples of step apart, so the offset is exact
        let slot = ((bin - first_bin) / step) as usize;
        groups[slot].push(*row);
    }
    debug!(
        "Resampling {} rows into {num_bins} bins of {freq}",
        frame.num_rows()
    );

    let labels: Vec<i64> = (0..num_bins as i64).map(|k| first_bin + k * step).collect();
    let labels = TimestampNanosecondArray::from(labels).with_timezone_opt(stamps.timezone());

    let mut columns: Vec<(String, ArrayRef)> = vec![(name, Arc::new(labels))];
    for column in frame.columns() {
        let array = frame.key(&column)?;
        let rule = rules
            .iter()
            .rev()
            .find(|(names, _)| names.contains(&column.as_str()))
            .map(|(_, rule)| rule);
        let aggregated = match rule {
            None => new_null_array(array.data_type(), num_bins),
            Some(rule) => aggregate(array, &groups, rule)?,
        };
        columns.push((column, aggregated));
    }

    frame.with_columns(columns, num_bins)
}

fn aggregate(array: &ArrayRef, groups: &[Vec<usize>], rule: &Aggregation) -> Result<ArrayRef> {
    match rule {
        Aggregation::First | Aggregation::Last => {
            let pick = |group: &Vec<usize>| {
                let mut valid = group.iter().copied().filter(|row| array.is_valid(*row));
                if matches!(rule, Aggregation::First) {
                    valid.next()
                } else {
                    valid.last()
                }
            };
            let indices: Vec<Option<usize>> = groups.iter().map(pick).collect();
            take_optional(array.as_ref(), &indices)
        }
        _ => {
            let values = array_to_f64(array.as_ref())?;
            let reduced: Float64Array = groups
                .iter()
                .map(|group| {
                    let present: Vec<f64> = group
                        .iter()
                        .filter_map(|row| values[*row])
                        .filter(|v| !v.is_nan())
                        .collect();
                    rule.reduce(&present)
                })
                .collect();
            Ok(Arc::new(reduced))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::arrow::downcast_array;
    use arrow::array::{Array, Int64Array, StringArray};

    const MINUTE: i64 = 60_000_000_000;

    fn sample() -> Frame {
        // minutes 0, 1, 2, 7 -> 5min bins at 0 and 5
        let times = TimestampNanosecondArray::from(vec![0, MINUTE, 2 * MINUTE, 7 * MINUTE])
            .with_timezone("UTC");
        Frame::from_columns(
            vec![
                ("time", Arc::new(times) as ArrayRef),
                (
                    "v",
                    Arc::new(Int64Array::from(vec![Some(1), Some(2), None, Some(4)])) as ArrayRef,
                ),
                ("s", Arc::new(StringArray::from(vec!["a", "b", "c", "d"])) as ArrayRef),
                ("skip", Arc::new(Int64Array::from(vec![9, 9, 9, 9])) as ArrayRef),
            ],
            Some("time"),
        )
        .unwrap()
    }

    fn floats(frame: &Frame, name: &str) -> Vec<Option<f64>> {
        downcast_array::<Float64Array>(frame.column(name).unwrap().as_ref(), "Float64")
            .unwrap()
            .iter()
            .collect()
    }

    #[test]
    fn test_numeric_rules() {
        let freq = Frequency::parse("5min").unwrap();
        let frame = sample();
        let mean = resample(&frame, freq, &[(&["v"][..], Aggregation::Mean)]).unwrap();
        assert_eq!(mean.num_rows(), 2);
        assert_eq!(floats(&mean, "v"), vec![Some(1.5), Some(4.0)]);
        assert_eq!(mean.column("skip").unwrap().null_count(), 2);

        let max = resample(&frame, freq, &[(&["v"][..], Aggregation::Max)]).unwrap();
        assert_eq!(floats(&max, "v"), vec![Some(2.0), Some(4.0)]);
    }

    #[test]
    fn test_empty_bins() {
        let freq = Frequency::parse("2min").unwrap();
        let frame = sample();
        let sum = resample(&frame, freq, &[(&["v"][..], Aggregation::Sum)]).unwrap();
        // bins 0, 2, 4, 6
        assert_eq!(
            floats(&sum, "v"),
            vec![Some(3.0), Some(0.0), Some(0.0), Some(4.0)]
        );
        let min = resample(&frame, freq, &[(&["v"][..], Aggregation::Min)]).unwrap();
        assert_eq!(floats(&min, "v"), vec![Some(1.0), None, None, Some(4.0)]);
    }

    #[test]
    fn test_first_last_keep_type() {
        let freq = Frequency::parse("5min").unwrap();
        let frame = sample();
        let rules = [
            (&["s"][..], Aggregation::Last),
            (&["v"][..], Aggregation::First),
        ];
        let out = resample(&frame, freq, &rules).unwrap();
        let s = downcast_array::<StringArray>(out.column("s").unwrap().as_ref(), "Utf8").unwrap();
        assert_eq!(s.value(0), "c");
        assert_eq!(s.value(1), "d");
        let v = downcast_array::<Int64Array>(out.column("v").unwrap().as_ref(), "Int64").unwrap();
        assert_eq!(v.value(0), 1);
        assert_eq!(out.index().unwrap().data_type(), frame.index().unwrap().data_type());
    }

    #[test]
    fn test_bins_start_at_local_midnight() {
        const HOUR: i64 = 60 * MINUTE;
        // 2021-01-01 08:00 to 10:00 at +08:00
        let start = 1_609_459_200_000_000_000;
        let times = TimestampNanosecondArray::from(vec![start, start + HOUR, start + 2 * HOUR])
            .with_timezone("+08:00");
        let frame = Frame::from_columns(
            vec![
                ("time", Arc::new(times) as ArrayRef),
                ("v", Arc::new(Float64Array::from(vec![1.0, 2.0, 3.0])) as ArrayRef),
            ],
            Some("time"),
        )
        .unwrap();
        let daily = resample(&frame, Frequency::parse("1D").unwrap(), &[(&["v"][..], Aggregation::Sum)])
            .unwrap();
        let labels = downcast_array::<TimestampNanosecondArray>(daily.index().unwrap().as_ref(), "Timestamp")
            .unwrap();
        assert_eq!(labels.values().to_vec(), vec![1_609_430_400_000_000_000]);
        assert_eq!(labels.timezone(), Some("+08:00"));
        assert_eq!(floats(&daily, "v"), vec![Some(6.0)]);
    }

    #[test]
    fn test_odd_step_counts_from_midnight() {
        // 2021-01-01 00:00, 00:06 and 00:08 UTC
        let midnight = 1_609_459_200_000_000_000;
        let times = TimestampNanosecondArray::from(vec![midnight, midnight + 6 * MINUTE, midnight + 8 * MINUTE])
            .with_timezone("UTC");
        let frame = Frame::from_columns(
            vec![
                ("time", Arc::new(times) as ArrayRef),
                ("v", Arc::new(Float64Array::from(vec![1.0, 2.0, 3.0])) as ArrayRef),
            ],
            Some("time"),
        )
        .unwrap();
        let out = resample(&frame, Frequency::parse("7min").unwrap(), &[(&["v"][..], Aggregation::Sum)])
            .unwrap();
        let labels = downcast_array::<TimestampNanosecondArray>(out.index().unwrap().as_ref(), "Timestamp")
            .unwrap();
        assert_eq!(labels.values().to_vec(), vec![midnight, midnight + 7 * MINUTE]);
        assert_eq!(floats(&out, "v"), vec![Some(3.0), Some(3.0)]);
    }

    #[test]
    fn test_custom_rule() {
        let freq = Frequency::parse("5min").unwrap();
        let count = Aggregation::custom(|values| Some(values.len() as f64));
        let out = resample(&sample(), freq, &[(&["v"][..], count)]).unwrap();
        assert_eq!(floats(&out, "v"), vec![Some(2.0), Some(1.0)]);
    }

    #[test]
    fn test_errors() {
        let freq = Frequency::parse("5min").unwrap();
        assert!(matches!(
            resample(&sample(), freq, &[(&["nope"][..], Aggregation::Sum)]),
            Err(Error::KeyNotFound { .. })
        ));
        assert!(matches!(
            resample(&sample(), freq, &[(&["s"][..], Aggregation::Sum)]),
            Err(Error::TypeMismatch { .. })
        ));
        assert!("median".parse::<Aggregation>().is_err());
        assert!(matches!("sum".parse::<Aggregation>(), Ok(Aggregation::Sum)));
    }
}
