//! Time-series and tabular data utilities built on Apache Arrow.
//!
//! Timestamp normalization, time-indexed table helpers (search, shift,
//! resample, reindex, combine), CSV/Feather/Parquet I/O, Excel to CSV
//! conversion, a rotating-file logging context and a few filesystem and
//! serialization helpers.

extern crate self as tsframe;

pub mod config;
pub mod enum_table;
pub mod error;
pub mod frame;
pub mod time;
pub mod utils;

// Core types
pub use config::{IoConfig, LogConfig, TimeParseConfig};
pub use enum_table::EnumTable;
pub use error::{Error, Result};
pub use frame::{Axis, Frame};
pub use time::{DurationValue, EpochValue, Frequency, Timestamp, Zone};

// Arrow types
pub use arrow::datatypes::Schema as ArrowSchema;
pub use arrow::record_batch::RecordBatch;

// Frequently used functions
pub use time::{
    duration_to_seconds, format_duration, parse_iso8601, to_iso8601, to_naive, to_tz, to_utc,
};
pub use utils::io::{read_frame, write_frame};
