//! Strftime fragments and the common date/time layouts built from them

use super::stamp::Timestamp;
use crate::enum_table::EnumTable;

/// Named strftime fragments
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumTable)]
#[enum_table(value_type = "&'static str")]
pub enum FormatToken {
    /// Abbreviated weekday name: Sun, Mon, ..., Sat
    #[enum_table(value = "%a")]
    WeekdayShort,
    /// Full weekday name: Sunday, Monday, ..., Saturday
    #[enum_table(value = "%A")]
    WeekdayLong,
    /// Weekday from Sunday: 0..6
    #[enum_table(value = "%w")]
    WeekdayFromSunday,
    /// ISO weekday from Monday: 1..7
    #[enum_table(value = "%u")]
    WeekdayIso,
    /// Zero-padded day of month: 01..31
    #[enum_table(value = "%d")]
    Day,
    /// Day of month: 1..31
    #[enum_table(value = "%-d")]
    DayUnpadded,
    /// Abbreviated month name: Jan..Dec
    #[enum_table(value = "%b")]
    MonthShort,
    /// Full month name: January..December
    #[enum_table(value = "%B")]
    MonthLong,
    /// Zero-padded month: 01..12
    #[enum_table(value = "%m")]
    Month,
    /// Month: 1..12
    #[enum_table(value = "%-m")]
    MonthUnpadded,
    /// Year without century: 00..99
    #[enum_table(value = "%y")]
    YearShort,
    /// Year with century
    #[enum_table(value = "%Y")]
    Year,
    /// Zero-padded 24-hour clock: 00..23
    #[enum_table(value = "%H")]
    Hour24,
    /// 24-hour clock: 0..23
    #[enum_table(value = "%-H")]
    Hour24Unpadded,
    /// Zero-padded 12-hour clock: 01..12
    #[enum_table(value = "%I")]
    Hour12,
    /// 12-hour clock: 1..12
    #[enum_table(value = "%-I")]
    Hour12Unpadded,
    /// AM or PM
    #[enum_table(value = "%p")]
    AmPm,
    /// Zero-padded minute: 00..59
    #[enum_table(value = "%M")]
    Minute,
    /// Minute: 0..59
    #[enum_table(value = "%-M")]
    MinuteUnpadded,
    /// Zero-padded second: 00..59
    #[enum_table(value = "%S")]
    Second,
    /// Second: 0..59
    #[enum_table(value = "%-S")]
    SecondUnpadded,
    /// Microseconds, zero-padded to 6 digits
    #[enum_table(value = "%6f")]
    Microsecond,
    /// UTC offset as ±HHMM, empty for naive values
    #[enum_table(value = "%z")]
    Offset,
    /// Timezone abbreviation, empty for naive values
    #[enum_table(value = "%Z")]
    ZoneName,
    /// Day of year: 001..366
    #[enum_table(value = "%j")]
    DayOfYear,
}

impl FormatToken {
    /// The strftime fragment
    #[must_use]
    pub fn fragment(self) -> &'static str {
        self.value()
    }
}

/// `%Y{join}%m{join}%d`
#[must_use]
pub fn yymmdd(join: &str) -> String {
    [FormatToken::Year, FormatToken::Month, FormatToken::Day]
        .map(FormatToken::fragment)
        .join(join)
}

/// `%H{join}%M{join}%S`
#[must_use]
pub fn hhmmss(join: &str) -> String {
    [FormatToken::Hour24, FormatToken::Minute, FormatToken::Second]
        .map(FormatToken::fragment)
        .join(join)
}

/// Date layout, `join`, time layout
#[must_use]
pub fn dt(datej: &str, join: &str, timej: &str) -> String {
    format!("{}{join}{}", yymmdd(datej), hhmmss(timej))
}

/// A timestamp rendered with the common layouts
#[derive(Debug, Clone, Copy)]
pub struct TimeFormat {
    pub time: Timestamp,
}

impl TimeFormat {
    #[must_use]
    pub const fn new(time: Timestamp) -> Self {
        Self { time }
    }

    #[must_use]
    pub fn yymmdd(&self, join: &str) -> String {
        self.time.format(&yymmdd(join))
    }

    #[must_use]
    pub fn hhmmss(&self, join: &str) -> String {
        self.time.format(&hhmmss(join))
    }

    #[must_use]
    pub fn dt(&self, datej: &str, join: &str, timej: &str) -> String {
        self.time.format(&dt(datej, join, timej))
    }

    /// Render with a single fragment
    #[must_use]
    pub fn token(&self, token: FormatToken) -> String {
        self.time.format(token.fragment())
    }
}

impl From<Timestamp> for TimeFormat {
    fn from(time: Timestamp) -> Self {
        Self::new(time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layouts() {
        assert_eq!(yymmdd("-"), "%Y-%m-%d");
        assert_eq!(hhmmss(":"), "%H:%M:%S");
        assert_eq!(dt("", "_", ""), "%Y%m%d_%H%M%S");
    }

    #[test]
    fn test_render() {
        let time = Timestamp::parse("2021-06-05 07:08:09.000123").unwrap();
        let format = TimeFormat::new(time);
        assert_eq!(format.yymmdd("/"), "2021/06/05");
        assert_eq!(format.hhmmss(":"), "07:08:09");
        assert_eq!(format.dt("-", " ", ":"), "2021-06-05 07:08:09");
        assert_eq!(format.token(FormatToken::DayUnpadded), "5");
        assert_eq!(format.token(FormatToken::Microsecond), "000123");
        assert_eq!(format.token(FormatToken::WeekdayShort), "Sat");
    }

    #[test]
    fn test_registry_lookup() {
        assert_eq!(FormatToken::from_value(&"%Y"), Some(FormatToken::Year));
        assert_eq!(FormatToken::from_name("Hour12"), Some(FormatToken::Hour12));
        assert_eq!(FormatToken::keys().next(), Some("WeekdayShort"));
        assert_eq!(FormatToken::VARIANTS.len(), 25);
    }
}
