//! Absolute instants and UTC offsets.

use core::fmt;

use crate::utils::{self, MS_PER_MINUTE};

/// Max instant millisecond constant (100,000,000 days)
pub const MS_MAX_INSTANT: i64 = utils::MS_PER_DAY * 100_000_000;
/// Min instant millisecond constant
pub const MS_MIN_INSTANT: i64 = -MS_MAX_INSTANT;

/// An absolute point in time, measured in milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Instant(pub(crate) i64);

impl Instant {
    /// The `-infinity` sentinel used as the `effective_from` of a zone's first regime.
    ///
    /// This value is never a valid instant.
    pub const MIN: Self = Self(i64::MIN);

    /// The Unix epoch.
    pub const EPOCH: Self = Self(0);

    /// Creates an `Instant` without range validation.
    #[inline]
    pub const fn from_epoch_milliseconds(ms: i64) -> Self {
        Self(ms)
    }

    /// Creates an `Instant`, returning `None` when outside of the valid range.
    #[inline]
    pub fn try_from_epoch_milliseconds(ms: i64) -> Option<Self> {
        let instant = Self(ms);
        instant.is_valid().then_some(instant)
    }

    #[inline]
    pub const fn as_epoch_milliseconds(&self) -> i64 {
        self.0
    }

    /// Utility for determining if the instant is within a valid range.
    #[inline]
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        MS_MIN_INSTANT <= self.0 && self.0 <= MS_MAX_INSTANT
    }

    /// Returns the wall clock milliseconds of this instant for a given offset.
    #[inline]
    pub const fn wall_milliseconds(&self, offset: UtcOffsetMinutes) -> i64 {
        self.0.saturating_add(offset.as_milliseconds())
    }
}

impl From<i64> for Instant {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::MIN {
            return f.write_str("-infinity");
        }
        let (days, ms) = utils::epoch_ms_to_days_and_ms(self.0);
        let (year, month, day) = utils::ymd_from_epoch_days(days);
        let hour = ms / utils::MS_PER_HOUR;
        let minute = (ms / MS_PER_MINUTE) % 60;
        let second = (ms / utils::MS_PER_SECOND) % 60;
        let millis = ms % utils::MS_PER_SECOND;
        write!(
            f,
            "{year:04}-{month:02}-{day:02}T{hour:02}:{minute:02}:{second:02}"
        )?;
        if millis != 0 {
            write!(f, ".{millis:03}")?;
        }
        f.write_str("Z")
    }
}

/// `UtcOffsetMinutes` represents the amount of minutes we need to add to UTC to reach the
/// local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct UtcOffsetMinutes(pub i32);

impl UtcOffsetMinutes {
    pub const ZERO: Self = Self(0);

    #[inline]
    pub const fn from_hours_and_minutes(hours: i32, minutes: i32) -> Self {
        Self(hours * 60 + minutes)
    }

    #[inline]
    pub const fn as_milliseconds(&self) -> i64 {
        self.0 as i64 * MS_PER_MINUTE
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl core::ops::Add for UtcOffsetMinutes {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl fmt::Display for UtcOffsetMinutes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { '-' } else { '+' };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{:02}:{:02}", abs / 60, abs % 60)
    }
}
