//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float64Array, TimestampNanosecondArray};
use tsframe::Frame;
use tsframe::time::Zone;

pub const HOUR_NANOS: i64 = 3_600_000_000_000;
/// 2021-01-01T00:00:00Z
pub const JAN_1_2021: i64 = 1_609_459_200_000_000_000;

/// Nanosecond timestamps `JAN_1_2021 + hours[i] h` tagged with `zone`
#[must_use]
pub fn hours(hours: &[i64], zone: Option<Zone>) -> ArrayRef {
    let values: Vec<i64> = hours.iter().map(|h| JAN_1_2021 + h * HOUR_NANOS).collect();
    Arc::new(TimestampNanosecondArray::from(values).with_timezone_opt(zone.map(|z| z.to_arrow())))
}

/// A frame indexed by `time` (UTC) with one float column `v`
#[must_use]
pub fn hourly_frame(offsets: &[i64], values: Vec<Option<f64>>) -> Frame {
    Frame::from_columns(
        vec![
            ("time", hours(offsets, Some(Zone::Utc))),
            ("v", Arc::new(Float64Array::from(values)) as ArrayRef),
        ],
        Some("time"),
    )
    .unwrap()
}

/// Values of a float column
#[must_use]
pub fn floats(frame: &Frame, name: &str) -> Vec<Option<f64>> {
    let column = frame.key(name).unwrap();
    let column = column.as_any().downcast_ref::<Float64Array>().unwrap();
    column.iter().collect()
}

/// Values of a nanosecond timestamp column or index
#[must_use]
pub fn stamps(frame: &Frame, name: &str) -> Vec<i64> {
    let column = frame.key(name).unwrap();
    let column = column
        .as_any()
        .downcast_ref::<TimestampNanosecondArray>()
        .unwrap();
    column.values().to_vec()
}
