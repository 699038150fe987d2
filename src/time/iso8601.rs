//! ISO-8601 parsing to epoch milliseconds and epoch formatting

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, TimeDelta};
use regex::Regex;

static ISO8601: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)([0-9]{4})-?([0-9]{2})-?([0-9]{2})(?:T|\s)?([0-9]{2}):?([0-9]{2}):?([0-9]{2})(\.[0-9]{1,3})?(?:([+-])([0-9]{2}):?([0-9]{2})|Z)?",
    )
    .expect("ISO-8601 pattern is valid")
});

/// Parse the first ISO-8601 timestamp found in `text` to UTC epoch milliseconds
///
/// The string is searched, not matched whole. A fraction is right-padded to
/// milliseconds, and an offset is subtracted from the local time.
///
/// # Returns
/// The epoch milliseconds, or `-1` when there is no input, no match, or the
/// matched fields do not form a valid datetime
#[must_use]
pub fn parse_iso8601(text: Option<&str>) -> i64 {
    text.and_then(try_parse_iso8601).unwrap_or(-1)
}

/// Like [`parse_iso8601`], but distinguishes failure from the instant `-1 ms`
#[must_use]
pub fn try_parse_iso8601(text: &str) -> Option<i64> {
    let caps = ISO8601.captures(text)?;
    let field = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());

    let date = NaiveDate::from_ymd_opt(i32::try_from(field(1)?).ok()?, field(2)?, field(3)?)?;
    let local = date.and_hms_opt(field(4)?, field(5)?, field(6)?)?;

    let millis = caps.get(7).map_or(Some(0), |m| {
        let digits = &m.as_str()[1..];
        format!("{digits:0<3}").parse::<i64>().ok()
    })?;

    let offset = match caps.get(8) {
        Some(sign) => {
            let minutes = i64::from(field(9)?) * 60 + i64::from(field(10)?);
            if sign.as_str() == "-" { -minutes } else { minutes }
        }
        None => 0,
    };

    let utc = local.checked_sub_signed(TimeDelta::minutes(offset))?;
    Some(utc.and_utc().timestamp() * 1000 + millis)
}

/// An epoch instant with an explicit unit
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EpochValue {
    Millis(i64),
    Seconds(f64),
}

impl From<i64> for EpochValue {
    fn from(value: i64) -> Self {
        Self::Millis(value)
    }
}

impl From<f64> for EpochValue {
    fn from(value: f64) -> Self {
        Self::Seconds(value)
    }
}

/// Render an epoch instant as a UTC ISO-8601 string
///
/// Microseconds are appended only when non-zero:
/// `2021-06-15T12:30:00+00:00`, `2021-06-15T12:30:00.250000+00:00`.
///
/// # Returns
/// `None` if the instant is out of the representable range
#[must_use]
pub fn to_iso8601(epoch: impl Into<EpochValue>) -> Option<String> {
    let micros = match epoch.into() {
        EpochValue::Millis(ms) => ms.checked_mul(1000)?,
        EpochValue::Seconds(s) => {
            let micros = (s * 1e6).round();
            if !micros.is_finite() || micros.abs() >= i64::MAX as f64 {
                return None;
            }
            micros as i64
        }
    };
    let dt = DateTime::from_timestamp_micros(micros)?;
    let format = if dt.timestamp_subsec_micros() == 0 {
        "%Y-%m-%dT%H:%M:%S+00:00"
    } else {
        "%Y-%m-%dT%H:%M:%S%.6f+00:00"
    };
    Some(dt.format(format).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOON_HALF: i64 = 1_623_760_200_000;

    #[test]
    fn test_parse_variants() {
        assert_eq!(parse_iso8601(Some("2021-06-15T12:30:00Z")), NOON_HALF);
        assert_eq!(parse_iso8601(Some("2021-06-15T12:30:00+00:00")), NOON_HALF);
        assert_eq!(parse_iso8601(Some("20210615T123000")), NOON_HALF);
        assert_eq!(parse_iso8601(Some("2021-06-15 12:30:00")), NOON_HALF);
        assert_eq!(
            parse_iso8601(Some("2021-06-15T20:30:00+08:00")),
            NOON_HALF
        );
        assert_eq!(
            parse_iso8601(Some("2021-06-15T07:00:00-0530")),
            NOON_HALF
        );
        assert_eq!(
            parse_iso8601(Some("at 2021-06-15t12:30:00.5z please")),
            NOON_HALF + 500
        );
        assert_eq!(
            parse_iso8601(Some("2021-06-15T12:30:00.05Z")),
            NOON_HALF + 50
        );
    }

    #[test]
    fn test_sentinel() {
        assert_eq!(parse_iso8601(None), -1);
        assert_eq!(parse_iso8601(Some("not-a-date")), -1);
        assert_eq!(parse_iso8601(Some("2021-13-45T12:30:00Z")), -1);
        assert_eq!(try_parse_iso8601("1969-12-31T23:59:59.999Z"), Some(-1));
    }

    #[test]
    fn test_to_iso8601_unit_inference() {
        assert_eq!(
            to_iso8601(NOON_HALF).as_deref(),
            Some("2021-06-15T12:30:00+00:00")
        );
        assert_eq!(
            to_iso8601(1_623_760_200.0).as_deref(),
            Some("2021-06-15T12:30:00+00:00")
        );
        assert_eq!(
            to_iso8601(EpochValue::Seconds(1_623_760_200.25)).as_deref(),
            Some("2021-06-15T12:30:00.250000+00:00")
        );
        assert_eq!(to_iso8601(f64::NAN), None);
    }
}
