//! Time utilities
//!
//! Timestamps, zones, durations and frequencies, plus the operations built on
//! them: timezone normalization, compact duration formatting, ISO-8601
//! parsing and time-index completion.

pub mod convert;
pub mod duration;
pub mod frequency;
pub mod index;
pub mod iso8601;
pub mod stamp;
pub mod timeformat;
pub mod units;
pub mod zone;

pub use convert::{
    TimeValue, array_to_tz, df_to_datetime, df_to_datetime_with_tz, timestamp_to_tz,
    to_datetime64, to_naive, to_naive_inplace, to_std_tz, to_tz, to_tz_inplace, to_utc,
    to_utc_inplace,
};
pub use duration::{DurationValue, duration_to_seconds};
pub use frequency::{Frequency, replace_m2min};
pub use index::{complete_time_array, complete_timeindex, date_range};
pub use iso8601::{EpochValue, parse_iso8601, to_iso8601, try_parse_iso8601};
pub use stamp::{Timestamp, datetime_to_ms, datetime_to_str, now, str_now};
pub use timeformat::{FormatToken, TimeFormat};
pub use units::{TimeFrame, UnitTable, format_duration};
pub use zone::Zone;
