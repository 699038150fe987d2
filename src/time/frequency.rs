//! Fixed-step frequencies
//!
//! A [`Frequency`] is a positive step in nanoseconds. It is parsed from
//! compound alias strings such as `"5min"`, `"2h20min"` or `"1D10us"`; a bare
//! `m` is read as minutes. Calendar-relative units (month, quarter, year) have
//! no fixed length and are rejected.

use std::fmt;
use std::str::FromStr;

use super::duration::DurationValue;
use super::stamp::{NANOS_PER_DAY, NANOS_PER_SECOND};
use crate::error::{Error, Result};

/// A positive, fixed time step
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Frequency {
    nanos: i64,
}

impl Frequency {
    /// Create a frequency from a nanosecond step
    ///
    /// # Errors
    /// Returns [`Error::InvalidFrequency`] unless `nanos` is positive
    pub fn from_nanos(nanos: i64) -> Result<Self> {
        if nanos <= 0 {
            return Err(Error::InvalidFrequency(format!("{nanos}ns")));
        }
        Ok(Self { nanos })
    }

    /// Create a frequency from any duration representation
    ///
    /// # Errors
    /// Returns [`Error::InvalidFrequency`] unless the duration is positive
    pub fn from_duration(duration: impl Into<DurationValue>) -> Result<Self> {
        Self::from_nanos(duration.into().total_nanos())
    }

    /// Parse a compound alias string
    ///
    /// Units: `W`, `D`, `h`/`H`, `min`/`T`/`m`, `s`/`S`, `ms`/`L`, `us`/`U`,
    /// `ns`/`N`. A missing count means 1.
    ///
    /// # Errors
    /// Returns [`Error::InvalidFrequency`] for unknown or calendar units, or a
    /// non-positive total
    pub fn parse(s: &str) -> Result<Self> {
        let text = replace_m2min(s.trim());
        let invalid = || Error::InvalidFrequency(s.to_string());

        let mut total: i64 = 0;
        let mut rest = text.as_str();
        while !rest.is_empty() {
            let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
            let count = if digits == 0 {
                1
            } else {
                rest[..digits].parse::<i64>().map_err(|_| invalid())?
            };
            rest = &rest[digits..];

            let letters = rest.bytes().take_while(u8::is_ascii_alphabetic).count();
            if letters == 0 {
                return Err(invalid());
            }
            let unit = unit_nanos(&rest[..letters]).ok_or_else(invalid)?;
            rest = &rest[letters..];

            total = count
                .checked_mul(unit)
                .and_then(|step| total.checked_add(step))
                .ok_or_else(invalid)?;
        }

        Self::from_nanos(total).map_err(|_| invalid())
    }

    /// Step in nanoseconds
    #[must_use]
    pub const fn nanos(&self) -> i64 {
        self.nanos
    }

    /// Step in seconds
    #[must_use]
    pub fn seconds(&self) -> f64 {
        self.nanos as f64 / NANOS_PER_SECOND as f64
    }
}

fn unit_nanos(unit: &str) -> Option<i64> {
    Some(match unit {
        "W" | "w" => 7 * NANOS_PER_DAY,
        "D" | "d" => NANOS_PER_DAY,
        "h" | "H" => 3_600 * NANOS_PER_SECOND,
        "min" | "T" => 60 * NANOS_PER_SECOND,
        "s" | "S" => NANOS_PER_SECOND,
        "ms" | "L" => 1_000_000,
        "us" | "U" => 1_000,
        "ns" | "N" => 1,
        _ => return None,
    })
}

/// Replace a standalone `m` unit with `min`
///
/// An `m` is rewritten when it starts the text or follows a digit or a
/// non-word character, and is not followed by a letter: `"1h30m"` becomes
/// `"1h30min"`, while `"ms"`, `"min"` and `"5mo"` are untouched.
#[must_use]
pub fn replace_m2min(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        let standalone = c == 'm'
            && (i == 0 || {
                let prev = chars[i - 1];
                prev.is_ascii_digit() || !(prev.is_alphanumeric() || prev == '_')
            })
            && chars.get(i + 1).is_none_or(|next| !next.is_ascii_alphabetic());
        if standalone {
            out.push_str("min");
        } else {
            out.push(c);
        }
    }
    out
}

impl FromStr for Frequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<DurationValue> for Frequency {
    type Error = Error;

    fn try_from(value: DurationValue) -> Result<Self> {
        Self::from_duration(value)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ns", self.nanos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!(Frequency::parse("5min").unwrap().nanos(), 300 * NANOS_PER_SECOND);
        assert_eq!(Frequency::parse("h").unwrap().nanos(), 3_600 * NANOS_PER_SECOND);
        assert_eq!(
            Frequency::parse("2h20min").unwrap().nanos(),
            140 * 60 * NANOS_PER_SECOND
        );
        assert_eq!(
            Frequency::parse("1D10us").unwrap().nanos(),
            NANOS_PER_DAY + 10_000
        );
        assert_eq!(
            Frequency::parse("1h30m").unwrap(),
            Frequency::parse("90min").unwrap()
        );
        assert_eq!(Frequency::parse("15T").unwrap().seconds(), 900.0);
    }

    #[test]
    fn test_calendar_units_rejected() {
        for alias in ["M", "MS", "Q", "Y", "3mo", "0s", "", "5x"] {
            assert!(
                matches!(Frequency::parse(alias), Err(Error::InvalidFrequency(_))),
                "{alias} should be rejected"
            );
        }
    }

    #[test]
    fn test_replace_m2min() {
        assert_eq!(replace_m2min("1h30m"), "1h30min");
        assert_eq!(replace_m2min("m"), "min");
        assert_eq!(replace_m2min("5ms"), "5ms");
        assert_eq!(replace_m2min("5min"), "5min");
        assert_eq!(replace_m2min("every m, 2m"), "every min, 2min");
        assert_eq!(replace_m2min("am"), "am");
    }

    #[test]
    fn test_from_duration() {
        let freq = Frequency::from_duration(std::time::Duration::from_secs(60)).unwrap();
        assert_eq!(freq, Frequency::parse("1min").unwrap());
        assert!(Frequency::from_duration(chrono::TimeDelta::zero()).is_err());
    }
}
