//! Timestamp values
//!
//! A [`Timestamp`] is a nanosecond count plus an optional [`Zone`]. Aware
//! timestamps hold the UTC instant; naive timestamps hold wall-clock time read
//! as if it were UTC, which is also how Arrow stores `Timestamp(_, None)`.

use std::fmt;

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use super::zone::Zone;
use crate::config::TimeParseConfig;
use crate::error::{Error, Result};

pub(crate) const NANOS_PER_MILLI: i64 = 1_000_000;
pub(crate) const NANOS_PER_SECOND: i64 = 1_000_000_000;
pub(crate) const NANOS_PER_DAY: i64 = 86_400 * NANOS_PER_SECOND;

/// A point in time with nanosecond resolution and optional zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    nanos: i64,
    zone: Option<Zone>,
}

impl Timestamp {
    /// Create a timestamp from nanoseconds since the epoch
    #[must_use]
    pub const fn from_nanos(nanos: i64, zone: Option<Zone>) -> Self {
        Self { nanos, zone }
    }

    /// Create a naive timestamp from a wall-clock datetime
    ///
    /// # Errors
    /// Returns [`Error::InvalidTimestamp`] if the value does not fit in `i64` nanoseconds
    pub fn from_naive(dt: &NaiveDateTime) -> Result<Self> {
        let nanos = dt
            .and_utc()
            .timestamp_nanos_opt()
            .ok_or_else(|| Error::InvalidTimestamp(dt.to_string()))?;
        Ok(Self { nanos, zone: None })
    }

    /// Create an aware timestamp from a zoned datetime
    ///
    /// # Errors
    /// Returns [`Error::InvalidTimestamp`] if the value does not fit in `i64` nanoseconds
    pub fn from_datetime<T: TimeZone + ZoneOf>(dt: &DateTime<T>) -> Result<Self> {
        let nanos = dt
            .timestamp_nanos_opt()
            .ok_or_else(|| Error::InvalidTimestamp(dt.naive_utc().to_string()))?;
        Ok(Self {
            nanos,
            zone: Some(dt.timezone().zone_of()),
        })
    }

    /// Parse a string with the default [`TimeParseConfig`]
    ///
    /// # Errors
    /// Returns [`Error::InvalidTimestamp`] if no configured format matches
    pub fn parse(s: &str) -> Result<Self> {
        Self::parse_with(s, &TimeParseConfig::default())
    }

    /// Parse a string trying each configured format in turn
    ///
    /// RFC 3339 strings are tried first. Values carrying an offset become
    /// aware timestamps (`Z` maps to UTC); everything else is naive.
    ///
    /// # Errors
    /// Returns [`Error::InvalidTimestamp`] if no configured format matches
    pub fn parse_with(s: &str, config: &TimeParseConfig) -> Result<Self> {
        let s = s.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            if s.ends_with(['Z', 'z']) {
                return Self::from_datetime(&dt.with_timezone(&Utc));
            }
            return Self::from_datetime(&dt);
        }
        for format in &config.offset_formats {
            if let Ok(dt) = DateTime::parse_from_str(s, format) {
                return Self::from_datetime(&dt);
            }
        }
        for format in &config.naive_formats {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
                return Self::from_naive(&dt);
            }
        }
        for format in &config.date_formats {
            if let Ok(date) = NaiveDate::parse_from_str(s, format) {
                return Self::from_naive(&date.and_time(chrono::NaiveTime::MIN));
            }
        }

        Err(Error::InvalidTimestamp(s.to_string()))
    }

    /// Nanoseconds since the epoch
    #[must_use]
    pub const fn nanos(&self) -> i64 {
        self.nanos
    }

    /// The zone, `None` for naive timestamps
    #[must_use]
    pub const fn zone(&self) -> Option<Zone> {
        self.zone
    }

    /// Whether the timestamp carries a zone
    #[must_use]
    pub const fn is_aware(&self) -> bool {
        self.zone.is_some()
    }

    /// Same nanosecond count with a different zone tag
    #[must_use]
    pub const fn with_zone(self, zone: Option<Zone>) -> Self {
        Self {
            nanos: self.nanos,
            zone,
        }
    }

    /// The stored instant as a naive datetime (UTC for aware values)
    #[must_use]
    pub fn naive_utc(&self) -> NaiveDateTime {
        DateTime::from_timestamp_nanos(self.nanos).naive_utc()
    }

    /// Wall-clock time in the timestamp's own zone
    #[must_use]
    pub fn naive_local(&self) -> NaiveDateTime {
        let utc = self.naive_utc();
        self.zone.map_or(utc, |zone| zone.local_from_utc(&utc))
    }

    /// Milliseconds since the epoch, flooring sub-millisecond precision
    #[must_use]
    pub const fn timestamp_millis(&self) -> i64 {
        self.nanos.div_euclid(NANOS_PER_MILLI)
    }

    /// Render with a strftime format string
    ///
    /// `%z` and `%Z` only carry information for aware timestamps.
    #[must_use]
    pub fn format(&self, format: &str) -> String {
        let utc = DateTime::from_timestamp_nanos(self.nanos);
        match self.zone {
            None => utc.naive_utc().format(format).to_string(),
            Some(Zone::Utc) => utc.format(format).to_string(),
            Some(Zone::Fixed(offset)) => utc.with_timezone(&offset).format(format).to_string(),
            Some(Zone::Named(tz)) => utc.with_timezone(&tz).format(format).to_string(),
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_aware() {
            f.write_str(&self.format("%Y-%m-%dT%H:%M:%S%.f%:z"))
        } else {
            f.write_str(&self.format("%Y-%m-%dT%H:%M:%S%.f"))
        }
    }
}

/// Timezone types that map onto a [`Zone`]
pub trait ZoneOf {
    fn zone_of(&self) -> Zone;
}

impl ZoneOf for Utc {
    fn zone_of(&self) -> Zone {
        Zone::Utc
    }
}

impl ZoneOf for FixedOffset {
    fn zone_of(&self) -> Zone {
        Zone::Fixed(*self)
    }
}

impl ZoneOf for Tz {
    fn zone_of(&self) -> Zone {
        Zone::Named(*self)
    }
}

/// Current time
///
/// With a zone the result is aware; without one it is the naive local
/// wall-clock time of the machine.
#[must_use]
pub fn now(zone: Option<Zone>) -> Timestamp {
    let nanos_of = |dt: NaiveDateTime| dt.and_utc().timestamp_nanos_opt().unwrap_or(i64::MAX);
    match zone {
        None => Timestamp::from_nanos(nanos_of(Local::now().naive_local()), None),
        Some(zone) => Timestamp::from_nanos(nanos_of(Utc::now().naive_utc()), Some(zone)),
    }
}

/// Current time rendered with a strftime format
#[must_use]
pub fn str_now(format: &str, zone: Option<Zone>) -> String {
    now(zone).format(format)
}

/// Milliseconds since the epoch; naive timestamps are read as UTC
#[must_use]
pub const fn datetime_to_ms(time: &Timestamp) -> i64 {
    time.timestamp_millis()
}

/// Render a timestamp with a strftime format
#[must_use]
pub fn datetime_to_str(time: &Timestamp, format: &str) -> String {
    time.format(format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shapes() {
        let aware = Timestamp::parse("2021-06-15T12:30:00+08:00").unwrap();
        assert!(aware.is_aware());
        assert_eq!(aware.naive_utc().to_string(), "2021-06-15 04:30:00");

        let zulu = Timestamp::parse("2021-06-15T12:30:00Z").unwrap();
        assert_eq!(zulu.zone(), Some(Zone::Utc));

        let naive = Timestamp::parse("2021-06-15 12:30:00").unwrap();
        assert!(!naive.is_aware());
        assert_eq!(naive.naive_utc().to_string(), "2021-06-15 12:30:00");

        let date = Timestamp::parse("2021/06/15").unwrap();
        assert_eq!(date.naive_utc().to_string(), "2021-06-15 00:00:00");

        assert!(matches!(
            Timestamp::parse("yesterday"),
            Err(Error::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn test_format_respects_zone() {
        let ts = Timestamp::parse("2021-06-15T04:30:00Z")
            .unwrap()
            .with_zone(Some(Zone::parse("Asia/Shanghai").unwrap()));
        assert_eq!(ts.format("%Y-%m-%d %H:%M %Z"), "2021-06-15 12:30 CST");
        assert_eq!(ts.to_string(), "2021-06-15T12:30:00+08:00");
    }

    #[test]
    fn test_datetime_to_ms_floors() {
        let ts = Timestamp::from_nanos(-1, None);
        assert_eq!(datetime_to_ms(&ts), -1);
        let ts = Timestamp::parse("1970-01-01T00:00:01.5Z").unwrap();
        assert_eq!(datetime_to_ms(&ts), 1500);
    }

    #[test]
    fn test_now_is_aware_when_zoned() {
        assert!(now(Some(Zone::Utc)).is_aware());
        assert!(!now(None).is_aware());
        assert_eq!(str_now("%Y", Some(Zone::Utc)).len(), 4);
    }
}
