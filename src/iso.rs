//! This module implements the wall clock field records.
//!
//!   - `IsoDate`: year, month and day of the proleptic Gregorian calendar
//!   - `IsoTime`: hour, minute, second and millisecond
//!   - `LocalDateTime`: an `IsoDate` and `IsoTime` pair with a derived `Weekday`
//!
//! None of these records carry a time zone. A `LocalDateTime` is either the
//! wall clock reading of some zone or, when produced by
//! [`LocalDateTime::from_instant_utc`], the UTC fields of an instant.

use core::{fmt, str::FromStr};

use zonedata_rs::{
    utils::{self, MS_PER_DAY, MS_PER_HOUR, MS_PER_MINUTE, MS_PER_SECOND},
    Instant, UtcOffsetMinutes,
};

use crate::{OracleError, OracleResult};

/// The minimum supported year.
pub const MIN_YEAR: i32 = utils::MIN_YEAR;
/// The maximum supported year.
pub const MAX_YEAR: i32 = utils::MAX_YEAR;

/// An ISO 8601 day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum Weekday {
    #[cfg_attr(feature = "serde", serde(alias = "Mon"))]
    Monday = 1,
    #[cfg_attr(feature = "serde", serde(alias = "Tue"))]
    Tuesday,
    #[cfg_attr(feature = "serde", serde(alias = "Wed"))]
    Wednesday,
    #[cfg_attr(feature = "serde", serde(alias = "Thu"))]
    Thursday,
    #[cfg_attr(feature = "serde", serde(alias = "Fri"))]
    Friday,
    #[cfg_attr(feature = "serde", serde(alias = "Sat"))]
    Saturday,
    #[cfg_attr(feature = "serde", serde(alias = "Sun"))]
    Sunday,
}

impl Weekday {
    /// Returns the weekday for an ISO day number, where Monday is 1.
    pub const fn from_iso_number(n: u8) -> Option<Self> {
        Some(match n {
            1 => Self::Monday,
            2 => Self::Tuesday,
            3 => Self::Wednesday,
            4 => Self::Thursday,
            5 => Self::Friday,
            6 => Self::Saturday,
            7 => Self::Sunday,
            _ => return None,
        })
    }

    /// Returns the weekday of a count of days since the Unix epoch.
    pub const fn from_epoch_days(epoch_days: i64) -> Self {
        match utils::epoch_days_to_week_day(epoch_days) {
            1 => Self::Monday,
            2 => Self::Tuesday,
            3 => Self::Wednesday,
            4 => Self::Thursday,
            5 => Self::Friday,
            6 => Self::Saturday,
            _ => Self::Sunday,
        }
    }

    /// Returns the three letter English abbreviation.
    pub const fn abbreviation(self) -> &'static str {
        match self {
            Self::Monday => "Mon",
            Self::Tuesday => "Tue",
            Self::Wednesday => "Wed",
            Self::Thursday => "Thu",
            Self::Friday => "Fri",
            Self::Saturday => "Sat",
            Self::Sunday => "Sun",
        }
    }
}

impl FromStr for Weekday {
    type Err = OracleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let weekday = match s {
            "Mon" | "Monday" => Self::Monday,
            "Tue" | "Tuesday" => Self::Tuesday,
            "Wed" | "Wednesday" => Self::Wednesday,
            "Thu" | "Thursday" => Self::Thursday,
            "Fri" | "Friday" => Self::Friday,
            "Sat" | "Saturday" => Self::Saturday,
            "Sun" | "Sunday" => Self::Sunday,
            _ => return Err(OracleError::parse().with_message("Invalid weekday.")),
        };
        Ok(weekday)
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

/// `IsoDate` is a validated proleptic Gregorian date.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IsoDate {
    pub year: i32,
    pub month: u8,
    pub day: u8,
}

impl IsoDate {
    /// Creates a new `IsoDate` without determining the validity.
    pub(crate) const fn new_unchecked(year: i32, month: u8, day: u8) -> Self {
        Self { year, month, day }
    }

    /// Creates a new validated `IsoDate`.
    pub fn try_new(year: i32, month: u8, day: u8) -> OracleResult<Self> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(OracleError::range().with_message("Year is out of the supported range."));
        }
        if !(1..=12).contains(&month) {
            return Err(OracleError::range().with_message("Month must be in 1..=12."));
        }
        if !(1..=utils::iso_days_in_month(year, month)).contains(&day) {
            return Err(
                OracleError::range().with_message("Day is not valid for the provided month.")
            );
        }
        Ok(Self::new_unchecked(year, month, day))
    }

    /// Returns the days since the Unix epoch.
    pub const fn to_epoch_days(self) -> i64 {
        utils::epoch_days_from_gregorian_date(self.year, self.month, self.day)
    }

    pub const fn from_epoch_days(epoch_days: i64) -> Self {
        let (year, month, day) = utils::ymd_from_epoch_days(epoch_days);
        Self::new_unchecked(year, month, day)
    }

    pub const fn weekday(self) -> Weekday {
        Weekday::from_epoch_days(self.to_epoch_days())
    }
}

/// `IsoTime` is a validated wall clock time with millisecond precision.
#[non_exhaustive]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IsoTime {
    pub hour: u8,         // 0..=23
    pub minute: u8,       // 0..=59
    pub second: u8,       // 0..=59
    pub millisecond: u16, // 0..=999
}

impl IsoTime {
    /// Creates a new `IsoTime` without any validation.
    pub(crate) const fn new_unchecked(hour: u8, minute: u8, second: u8, millisecond: u16) -> Self {
        Self {
            hour,
            minute,
            second,
            millisecond,
        }
    }

    /// Creates a new validated `IsoTime`.
    pub fn try_new(hour: u8, minute: u8, second: u8, millisecond: u16) -> OracleResult<Self> {
        let time = Self::new_unchecked(hour, minute, second, millisecond);
        if !time.is_valid() {
            return Err(OracleError::range().with_message("IsoTime is not valid"));
        }
        Ok(time)
    }

    /// Checks if the time is a valid `IsoTime`
    pub(crate) fn is_valid(&self) -> bool {
        if !(0..=23).contains(&self.hour) {
            return false;
        }

        let min_sec = 0..=59;
        min_sec.contains(&self.minute)
            && min_sec.contains(&self.second)
            && (0..=999).contains(&self.millisecond)
    }

    /// Returns the milliseconds elapsed since midnight.
    pub const fn to_milliseconds_of_day(self) -> i64 {
        self.hour as i64 * MS_PER_HOUR
            + self.minute as i64 * MS_PER_MINUTE
            + self.second as i64 * MS_PER_SECOND
            + self.millisecond as i64
    }

    /// Creates an `IsoTime` from milliseconds since midnight, which must be
    /// in `0..MS_PER_DAY`.
    pub(crate) const fn from_milliseconds_of_day(ms: i64) -> Self {
        Self::new_unchecked(
            (ms / MS_PER_HOUR) as u8,
            ((ms / MS_PER_MINUTE) % 60) as u8,
            ((ms / MS_PER_SECOND) % 60) as u8,
            (ms % MS_PER_SECOND) as u16,
        )
    }
}

/// `LocalDateTime` is a wall clock reading with no time zone attached.
///
/// The weekday is always derived from the date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LocalDateTime {
    date: IsoDate,
    time: IsoTime,
}

impl LocalDateTime {
    /// Creates a `LocalDateTime` from validated records.
    pub const fn new(date: IsoDate, time: IsoTime) -> Self {
        Self { date, time }
    }

    /// Creates a new validated `LocalDateTime` with zero milliseconds.
    ///
    /// ```rust
    /// use tz_oracle::iso::{LocalDateTime, Weekday};
    ///
    /// let local = LocalDateTime::try_new(1949, 12, 31, 20, 0, 0).unwrap();
    /// assert_eq!(local.weekday(), Weekday::Saturday);
    /// assert!(LocalDateTime::try_new(2023, 2, 29, 0, 0, 0).is_err());
    /// ```
    pub fn try_new(
        year: i32,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> OracleResult<Self> {
        Ok(Self::new(
            IsoDate::try_new(year, month, day)?,
            IsoTime::try_new(hour, minute, second, 0)?,
        ))
    }

    /// Returns this date time with the provided millisecond.
    pub fn with_millisecond(self, millisecond: u16) -> OracleResult<Self> {
        let time = IsoTime::try_new(
            self.time.hour,
            self.time.minute,
            self.time.second,
            millisecond,
        )?;
        Ok(Self::new(self.date, time))
    }

    /// Checks an advisory weekday against the date.
    ///
    /// Returns a range error when `weekday` is not the weekday of the date.
    pub fn with_weekday(self, weekday: Weekday) -> OracleResult<Self> {
        if self.weekday() != weekday {
            return Err(OracleError::range().with_message(alloc::format!(
                "{} is a {}, not a {}.",
                self.date_string(),
                self.weekday(),
                weekday
            )));
        }
        Ok(self)
    }

    #[inline]
    pub const fn date(&self) -> IsoDate {
        self.date
    }

    #[inline]
    pub const fn time(&self) -> IsoTime {
        self.time
    }

    #[inline]
    pub const fn year(&self) -> i32 {
        self.date.year
    }

    #[inline]
    pub const fn month(&self) -> u8 {
        self.date.month
    }

    #[inline]
    pub const fn day(&self) -> u8 {
        self.date.day
    }

    #[inline]
    pub const fn hour(&self) -> u8 {
        self.time.hour
    }

    #[inline]
    pub const fn minute(&self) -> u8 {
        self.time.minute
    }

    #[inline]
    pub const fn second(&self) -> u8 {
        self.time.second
    }

    #[inline]
    pub const fn millisecond(&self) -> u16 {
        self.time.millisecond
    }

    #[inline]
    pub const fn weekday(&self) -> Weekday {
        self.date.weekday()
    }

    /// Returns the fields as milliseconds since the epoch, as if they were UTC.
    pub const fn to_wall_milliseconds(&self) -> i64 {
        self.date.to_epoch_days() * MS_PER_DAY + self.time.to_milliseconds_of_day()
    }

    /// The inverse of [`LocalDateTime::to_wall_milliseconds`].
    pub const fn from_wall_milliseconds(ms: i64) -> Self {
        let (days, ms_of_day) = utils::epoch_ms_to_days_and_ms(ms);
        Self::new(
            IsoDate::from_epoch_days(days),
            IsoTime::from_milliseconds_of_day(ms_of_day),
        )
    }

    /// Returns the UTC fields of `instant`.
    pub const fn from_instant_utc(instant: Instant) -> Self {
        Self::from_wall_milliseconds(instant.as_epoch_milliseconds())
    }

    /// Returns the wall clock fields of `instant` at a fixed `offset`.
    pub const fn from_instant_with_offset(instant: Instant, offset: UtcOffsetMinutes) -> Self {
        Self::from_wall_milliseconds(instant.wall_milliseconds(offset))
    }

    /// Interprets the fields as UTC.
    pub const fn to_instant_utc(&self) -> Instant {
        Instant::from_epoch_milliseconds(self.to_wall_milliseconds())
    }

    fn date_string(&self) -> alloc::string::String {
        alloc::format!("{}", DateDisplay(self.date))
    }
}

struct DateDisplay(IsoDate);

impl fmt::Display for DateDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let IsoDate { year, month, day } = self.0;
        if (0..=9999).contains(&year) {
            write!(f, "{year:04}")?;
        } else {
            write!(f, "{year:+07}")?;
        }
        write!(f, "-{month:02}-{day:02}")
    }
}

impl fmt::Display for LocalDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let IsoTime {
            hour,
            minute,
            second,
            millisecond,
        } = self.time;
        write!(
            f,
            "{} {}T{hour:02}:{minute:02}:{second:02}",
            self.weekday(),
            DateDisplay(self.date)
        )?;
        if millisecond != 0 {
            write!(f, ".{millisecond:03}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use zonedata_rs::{Instant, UtcOffsetMinutes};

    use super::{IsoDate, IsoTime, LocalDateTime, Weekday};
    use crate::error::ErrorKind;

    #[test]
    fn date_validation() {
        assert!(IsoDate::try_new(2024, 2, 29).is_ok());
        assert!(IsoDate::try_new(2023, 2, 29).is_err());
        assert!(IsoDate::try_new(2023, 4, 31).is_err());
        assert!(IsoDate::try_new(2023, 13, 1).is_err());
        assert!(IsoDate::try_new(2023, 0, 1).is_err());
        assert!(IsoDate::try_new(275_761, 1, 1).is_err());
        assert!(IsoTime::try_new(24, 0, 0, 0).is_err());
        assert!(IsoTime::try_new(23, 60, 0, 0).is_err());
        assert!(IsoTime::try_new(23, 59, 59, 1000).is_err());
        assert!(IsoTime::try_new(23, 59, 59, 999).is_ok());
    }

    #[test]
    fn weekday_is_derived() {
        let local = LocalDateTime::try_new(1950, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(local.weekday(), Weekday::Sunday);
        assert!(local.with_weekday(Weekday::Sunday).is_ok());

        let err = local.with_weekday(Weekday::Saturday).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);
        assert_eq!(err.message(), "1950-01-01 is a Sun, not a Sat.");
    }

    #[test]
    fn weekday_parsing() {
        assert_eq!("Sat".parse::<Weekday>().unwrap(), Weekday::Saturday);
        assert_eq!("Thursday".parse::<Weekday>().unwrap(), Weekday::Thursday);
        assert!("sat".parse::<Weekday>().is_err());
        assert_eq!(Weekday::from_iso_number(7), Some(Weekday::Sunday));
        assert_eq!(Weekday::from_iso_number(0), None);
    }

    #[test]
    fn wall_milliseconds() {
        let local = LocalDateTime::try_new(1969, 12, 31, 23, 59, 59)
            .unwrap()
            .with_millisecond(999)
            .unwrap();
        assert_eq!(local.to_wall_milliseconds(), -1);
        assert_eq!(LocalDateTime::from_wall_milliseconds(-1), local);

        let utc = LocalDateTime::from_instant_utc(Instant::from_epoch_milliseconds(
            -631_162_800_000,
        ));
        assert_eq!(utc, LocalDateTime::try_new(1949, 12, 31, 21, 0, 0).unwrap());
        assert_eq!(utc.to_instant_utc().as_epoch_milliseconds(), -631_162_800_000);

        let aden = LocalDateTime::from_instant_with_offset(
            utc.to_instant_utc(),
            UtcOffsetMinutes::from_hours_and_minutes(3, 0),
        );
        assert_eq!(aden, LocalDateTime::try_new(1950, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn display() {
        let local = LocalDateTime::try_new(1949, 12, 31, 20, 0, 0).unwrap();
        assert_eq!(local.to_string(), "Sat 1949-12-31T20:00:00");
        let local = local.with_millisecond(5).unwrap();
        assert_eq!(local.to_string(), "Sat 1949-12-31T20:00:00.005");
        let local = LocalDateTime::try_new(-1, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(local.to_string(), "Fri -000001-01-01T00:00:00");
    }
}
