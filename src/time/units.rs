//! Compact duration formatting
//!
//! A duration is decomposed greedily over a descending table of units,
//! emitting `<count><label>` for every unit with a non-zero count:
//! `3661 s` renders as `1h1m1s`.

use std::fmt;

use smallvec::SmallVec;

use super::duration::{DurationValue, duration_to_seconds};

pub const YEAR_SECONDS: u64 = 365 * 86_400;
pub const WEEK_SECONDS: u64 = 7 * 86_400;
pub const DAY_SECONDS: u64 = 86_400;
pub const HOUR_SECONDS: u64 = 3_600;
pub const MINUTE_SECONDS: u64 = 60;
pub const SECOND_SECONDS: u64 = 1;

/// Ordered mapping from unit length in seconds to its label, longest first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitTable {
    units: SmallVec<[(u64, String); 6]>,
}

impl Default for UnitTable {
    fn default() -> Self {
        Self {
            units: SmallVec::from_vec(vec![
                (YEAR_SECONDS, "Y".to_string()),
                (WEEK_SECONDS, "W".to_string()),
                (DAY_SECONDS, "d".to_string()),
                (HOUR_SECONDS, "h".to_string()),
                (MINUTE_SECONDS, "m".to_string()),
                (SECOND_SECONDS, "s".to_string()),
            ]),
        }
    }
}

impl UnitTable {
    /// Set the label for a unit, adding the unit if it is not in the table
    pub fn set(&mut self, seconds: u64, label: impl Into<String>) -> &mut Self {
        let label = label.into();
        match self.units.iter_mut().find(|(s, _)| *s == seconds) {
            Some(entry) => entry.1 = label,
            None => {
                let pos = self.units.partition_point(|(s, _)| *s > seconds);
                self.units.insert(pos, (seconds, label));
            }
        }
        self
    }

    pub fn set_year(&mut self, label: impl Into<String>) -> &mut Self {
        self.set(YEAR_SECONDS, label)
    }

    pub fn set_week(&mut self, label: impl Into<String>) -> &mut Self {
        self.set(WEEK_SECONDS, label)
    }

    pub fn set_day(&mut self, label: impl Into<String>) -> &mut Self {
        self.set(DAY_SECONDS, label)
    }

    pub fn set_hour(&mut self, label: impl Into<String>) -> &mut Self {
        self.set(HOUR_SECONDS, label)
    }

    pub fn set_minute(&mut self, label: impl Into<String>) -> &mut Self {
        self.set(MINUTE_SECONDS, label)
    }

    pub fn set_second(&mut self, label: impl Into<String>) -> &mut Self {
        self.set(SECOND_SECONDS, label)
    }

    /// Label of the unit `seconds` long
    #[must_use]
    pub fn label(&self, seconds: u64) -> Option<&str> {
        self.iter().find(|(s, _)| *s == seconds).map(|(_, label)| label)
    }

    /// Units from longest to shortest
    pub fn iter(&self) -> impl Iterator<Item = (u64, &str)> {
        self.units.iter().map(|(s, label)| (*s, label.as_str()))
    }

    /// Format a number of seconds with this table
    ///
    /// Fractions below the shortest unit are dropped; zero and negative
    /// durations render as an empty string.
    #[must_use]
    pub fn format_seconds(&self, seconds: f64) -> String {
        let mut remaining = seconds;
        let mut out = String::new();
        for (unit, label) in self.iter() {
            let unit = unit as f64;
            let count = (remaining / unit).floor();
            if count > 0.0 {
                out.push_str(&format!("{}{label}", count as u64));
                remaining %= unit;
            }
        }
        out
    }
}

/// Format a duration with a unit table
#[must_use]
pub fn format_duration(duration: &DurationValue, units: &UnitTable) -> String {
    units.format_seconds(duration_to_seconds(duration))
}

/// A frequency paired with the unit table used to render it
#[derive(Debug, Clone)]
pub struct TimeFrame {
    pub freq: DurationValue,
    pub units: UnitTable,
}

impl TimeFrame {
    #[must_use]
    pub fn new(freq: impl Into<DurationValue>) -> Self {
        Self {
            freq: freq.into(),
            units: UnitTable::default(),
        }
    }

    #[must_use]
    pub fn with_units(mut self, units: UnitTable) -> Self {
        self.units = units;
        self
    }
}

impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_duration(&self.freq, &self.units))
    }
}
