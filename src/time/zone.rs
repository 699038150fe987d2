//! Timezone descriptors
//!
//! A [`Zone`] is the single way timezones enter the crate: parsed from the
//! strings users type (`"UTC"`, `"+08:00"`, `"Asia/Shanghai"`) and rendered to
//! the timezone string Arrow stores on `Timestamp` columns.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{FixedOffset, NaiveDateTime, Offset, TimeZone};
use chrono_tz::Tz;

use crate::error::{Error, Result};

/// A timezone: UTC, a fixed offset, or a named IANA zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    Utc,
    Fixed(FixedOffset),
    Named(Tz),
}

impl Zone {
    /// Parse a timezone descriptor
    ///
    /// Accepts `UTC`/`Z` (any case), `±HH:MM`, `±HHMM`, `±HH` and IANA names.
    ///
    /// # Errors
    /// Returns [`Error::InvalidTimezone`] if the descriptor matches none of these
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("utc") || s.eq_ignore_ascii_case("z") {
            return Ok(Self::Utc);
        }
        if s.starts_with('+') || s.starts_with('-') {
            return parse_offset(s)
                .map(Self::Fixed)
                .ok_or_else(|| Error::InvalidTimezone(s.to_string()));
        }
        s.parse::<Tz>()
            .map(Self::Named)
            .map_err(|_| Error::InvalidTimezone(s.to_string()))
    }

    /// Timezone string for an Arrow `Timestamp` data type
    #[must_use]
    pub fn to_arrow(&self) -> Arc<str> {
        Arc::from(self.to_string())
    }

    /// Offset from UTC in effect at the given UTC instant
    #[must_use]
    pub fn offset_at(&self, utc: &NaiveDateTime) -> FixedOffset {
        match self {
            Self::Utc => chrono::Utc.fix(),
            Self::Fixed(offset) => *offset,
            Self::Named(tz) => tz.offset_from_utc_datetime(utc).fix(),
        }
    }

    /// Wall-clock time in this zone for a UTC instant
    #[must_use]
    pub fn local_from_utc(&self, utc: &NaiveDateTime) -> NaiveDateTime {
        *utc + self.offset_at(utc)
    }

    /// UTC instant for a wall-clock time in this zone
    ///
    /// Ambiguous wall-clock times resolve to the earliest instant. Times that
    /// fall in a DST gap return `None`.
    #[must_use]
    pub fn utc_from_local(&self, local: &NaiveDateTime) -> Option<NaiveDateTime> {
        match self {
            Self::Utc => Some(*local),
            Self::Fixed(offset) => Some(*local - *offset),
            Self::Named(tz) => tz
                .from_local_datetime(local)
                .earliest()
                .map(|dt| dt.naive_utc()),
        }
    }
}

/// Parse `±HH:MM`, `±HHMM` or `±HH`
fn parse_offset(s: &str) -> Option<FixedOffset> {
    let (sign, rest) = match s.as_bytes().first()? {
        b'+' => (1, &s[1..]),
        b'-' => (-1, &s[1..]),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.is_empty() || digits.len() > 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let (hours, minutes) = if digits.len() <= 2 {
        (digits.parse::<i32>().ok()?, 0)
    } else {
        let split = digits.len() - 2;
        (
            digits[..split].parse::<i32>().ok()?,
            digits[split..].parse::<i32>().ok()?,
        )
    };
    if minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

impl FromStr for Zone {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Utc => f.write_str("UTC"),
            Self::Fixed(offset) => write!(f, "{offset}"),
            Self::Named(tz) => f.write_str(tz.name()),
        }
    }
}

impl From<Tz> for Zone {
    fn from(tz: Tz) -> Self {
        Self::Named(tz)
    }
}

impl From<FixedOffset> for Zone {
    fn from(offset: FixedOffset) -> Self {
        Self::Fixed(offset)
    }
}
