//! JSON serialization with time-aware field adapters
//!
//! Output is UTF-8 with a four-space indent and non-ASCII text left
//! unescaped. Datetimes and durations have no JSON form of their own, so
//! fields holding them opt into [`iso_datetime`] or [`timedelta_seconds`]
//! through `#[serde(with = "...")]`.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::error::Result;

const INDENT: &[u8] = b"    ";

fn write_pretty<W: Write, T: Serialize + ?Sized>(writer: W, value: &T) -> Result<()> {
    let mut serializer = Serializer::with_formatter(writer, PrettyFormatter::with_indent(INDENT));
    value.serialize(&mut serializer)?;
    Ok(())
}

/// Serialize `value` to an indented JSON string
///
/// # Errors
/// Returns [`Error::Json`](crate::Error::Json) if `value` cannot be serialized
pub fn dumps<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut buffer = Vec::new();
    write_pretty(&mut buffer, value)?;
    // serde_json only ever writes valid UTF-8
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Serialize `value` to a file, creating parent directories as needed
///
/// # Errors
/// Returns an IO error if the file cannot be written, or a JSON error if
/// `value` cannot be serialized
pub fn dump<T: Serialize + ?Sized>(value: &T, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    write_pretty(&mut writer, value)?;
    writer.flush()?;
    log::debug!("Wrote JSON to {}", path.display());
    Ok(())
}

/// Deserialize a value from a JSON file
///
/// # Errors
/// Returns an IO error if the file cannot be opened, or a JSON error if its
/// content does not match `T`
pub fn load<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let reader = BufReader::new(File::open(path.as_ref())?);
    Ok(serde_json::from_reader(reader)?)
}

/// ISO-8601 strings for `chrono` datetimes
///
/// Works for `DateTime<Utc>`, `DateTime<FixedOffset>` and `NaiveDateTime`.
/// Aware values are written with a `+HH:MM` offset.
pub mod iso_datetime {
    use chrono::{DateTime, FixedOffset, NaiveDateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

    /// Datetime types with an ISO-8601 text form
    pub trait IsoDateTime: Sized {
        fn to_iso(&self) -> String;
        fn from_iso(s: &str) -> Option<Self>;
    }

    impl IsoDateTime for DateTime<Utc> {
        fn to_iso(&self) -> String {
            self.to_rfc3339_opts(SecondsFormat::AutoSi, false)
        }

        fn from_iso(s: &str) -> Option<Self> {
            DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        }
    }

    impl IsoDateTime for DateTime<FixedOffset> {
        fn to_iso(&self) -> String {
            self.to_rfc3339_opts(SecondsFormat::AutoSi, false)
        }

        fn from_iso(s: &str) -> Option<Self> {
            DateTime::parse_from_rfc3339(s).ok()
        }
    }

    impl IsoDateTime for NaiveDateTime {
        fn to_iso(&self) -> String {
            self.format(NAIVE_FORMAT).to_string()
        }

        fn from_iso(s: &str) -> Option<Self> {
            Self::parse_from_str(s, NAIVE_FORMAT).ok()
        }
    }

    pub fn serialize<T: IsoDateTime, S: Serializer>(
        value: &T,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_iso())
    }

    pub fn deserialize<'de, T: IsoDateTime, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<T, D::Error> {
        let text = String::deserialize(deserializer)?;
        T::from_iso(&text)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid ISO-8601 datetime '{text}'")))
    }
}

/// Seconds as decimal strings (`"3600.0"`) for `chrono::TimeDelta`
///
/// Parsing keeps nanosecond precision.
pub mod timedelta_seconds {
    use chrono::TimeDelta;
    use serde::{Deserialize, Deserializer, Serializer};

    const NANOS_PER_SECOND: i64 = 1_000_000_000;

    #[must_use]
    pub fn to_text(value: &TimeDelta) -> String {
        let seconds = value.num_seconds();
        let nanos = value.subsec_nanos();
        if nanos == 0 {
            return format!("{seconds}.0");
        }
        let sign = if seconds < 0 || nanos < 0 { "-" } else { "" };
        let fraction = format!("{:09}", nanos.unsigned_abs());
        format!(
            "{sign}{}.{}",
            seconds.unsigned_abs(),
            fraction.trim_end_matches('0')
        )
    }

    #[must_use]
    pub fn from_text(text: &str) -> Option<TimeDelta> {
        let text = text.trim();
        let (negative, body) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };
        let (whole, fraction) = body.split_once('.').unwrap_or((body, ""));
        if whole.is_empty() && fraction.is_empty() {
            return None;
        }
        if !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
            // exponent notation and the like
            let seconds: f64 = text.parse().ok()?;
            return TimeDelta::try_milliseconds((seconds * 1000.0).round() as i64);
        }
        let seconds: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
        let digits: String = fraction.chars().chain(std::iter::repeat('0')).take(9).collect();
        let nanos: i64 = digits.parse().ok()?;
        let total = seconds.checked_mul(NANOS_PER_SECOND)?.checked_add(nanos)?;
        Some(TimeDelta::nanoseconds(if negative { -total } else { total }))
    }

    pub fn serialize<S: Serializer>(
        value: &TimeDelta,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&to_text(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<TimeDelta, D::Error> {
        let text = String::deserialize(deserializer)?;
        from_text(&text)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid seconds value '{text}'")))
    }
}
