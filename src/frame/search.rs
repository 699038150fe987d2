//! Left-biased search in a time key

use super::Frame;
use crate::error::Result;
use crate::time::{Timestamp, Zone, array_to_tz, timestamp_to_tz};
use crate::utils::arrow::downcast_array;
use arrow::array::{Array, TimestampNanosecondArray};

/// Position at which `time` would be inserted to keep `key` sorted
///
/// Both sides are compared in UTC. Ties resolve to the position before any
/// equal value. Nulls in the key sort first. With `clamp`, the result is
/// bounded to `[0, num_rows - 1]` (0 for an empty frame); otherwise it may be
/// `num_rows`.
///
/// # Arguments
/// * `time` - The timestamp to locate
/// * `frame` - The table to search
/// * `key` - Name of the index or of a time column, sorted ascending
/// * `clamp` - Bound the result to a valid row position
///
/// # Errors
/// Returns [`Error::KeyNotFound`](crate::Error::KeyNotFound) if `key` is
/// neither the index nor a column, and
/// [`Error::UnsupportedType`](crate::Error::UnsupportedType) if it is not a
/// time column
pub fn search_timeidx(time: &Timestamp, frame: &Frame, key: &str, clamp: bool) -> Result<usize> {
    let target = timestamp_to_tz(*time, Some(&Zone::Utc)).nanos();
    let column = frame.key(key)?;
    let utc = array_to_tz(column.as_ref(), Some(&Zone::Utc))?;
    let utc = downcast_array::<TimestampNanosecondArray>(utc.as_ref(), "Timestamp(ns)")?;

    let len = utc.len();
    let (mut lo, mut hi) = (0, len);
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        let value = if utc.is_null(mid) {
            i64::MIN
        } else {
            utc.value(mid)
        };
        if value < target {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }

    Ok(if clamp { lo.min(len.saturating_sub(1)) } else { lo })
}
