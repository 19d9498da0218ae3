//! Calendar and epoch arithmetic
//!
//! Gregorian calculations are based off Cassio Neri and Lorenz Schneider's
//! paper, [Euclidean affine functions and their application to calendar
//! algorithms][eaf-calendar-algorithms].
//!
//! ## Shift window
//!
//! The computational calendar only operates on non-negative rata die values,
//! so every epoch day is shifted by a whole number of 400 year cycles before
//! being run through the equations. A shift of 3670 cycles places the Unix
//! epoch near the center of the `u32` window and comfortably covers the
//! supported range of ±100,000,000 epoch days.
//!
//! [eaf-calendar-algorithms]: https://onlinelibrary.wiley.com/doi/full/10.1002/spe.3172

pub const MS_PER_SECOND: i64 = 1_000;
pub const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
pub const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
pub const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

/// The earliest year of the instant range.
pub const MIN_YEAR: i32 = -271_821;
/// The latest year of the instant range.
pub const MAX_YEAR: i32 = 275_760;

const EPOCH_COMPUTATIONAL_RATA_DIE: i64 = 719_468;
const DAYS_IN_A_400Y_CYCLE: i64 = 146_097;

const TWO_POWER_THIRTY_NINE: u64 = 549_755_813_888; // 2^39 constant
const TWO_POWER_SIXTEEN: u32 = 65_536; // 2^16 constant

const SHIFT_CONSTANT: i64 = 3670;
const SHIFT_DAYS: i64 = SHIFT_CONSTANT * DAYS_IN_A_400Y_CYCLE + EPOCH_COMPUTATIONAL_RATA_DIE;

/// Returns whether the provided proleptic Gregorian year is a leap year.
#[inline]
pub const fn is_leap(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Returns the number of days in `month` of `year`, or 0 for an invalid month.
#[inline]
pub const fn iso_days_in_month(year: i32, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Calculate the days since the Unix epoch for a Gregorian date.
pub const fn epoch_days_from_gregorian_date(year: i32, month: u8, day: u8) -> i64 {
    let j = (month <= 2) as i64;
    let computational_year = year as i64 + 400 * SHIFT_CONSTANT - j;
    let computational_month = month as i64 + 12 * j;
    let computational_day = day as i64 - 1;
    let century = computational_year / 100;
    let y_star = 1461 * computational_year / 4 - century + century / 4;
    let m_star = (979 * computational_month - 2919) / 32;
    y_star + m_star + computational_day - SHIFT_DAYS
}

/// Calculate the Gregorian year, month, and day for a count of epoch days.
pub const fn ymd_from_epoch_days(epoch_days: i64) -> (i32, u8, u8) {
    // NOTE: cast to u32 is safe for epoch days within ±536_000_000.
    let rata_die = (epoch_days + SHIFT_DAYS) as u32;
    let n_one = 4 * rata_die + 3;
    let century = n_one / DAYS_IN_A_400Y_CYCLE as u32;
    let n_two = (n_one % DAYS_IN_A_400Y_CYCLE as u32) | 3;
    let year_of_century = ((376_287_347 * n_two as u64) / TWO_POWER_THIRTY_NINE) as u32;
    let day_of_year = (n_two - 1461 * year_of_century) / 4;
    let n_three = 2141 * day_of_year + 197_913;
    let computational_month = n_three / TWO_POWER_SIXTEEN;
    let computational_day = (n_three % TWO_POWER_SIXTEEN) / 2141;
    let j = (day_of_year >= 306) as u32;
    let year = (100 * century + year_of_century + j) as i64 - 400 * SHIFT_CONSTANT;
    (
        year as i32,
        (computational_month - 12 * j) as u8,
        (computational_day + 1) as u8,
    )
}

/// Returns the ISO week day (Monday = 1, Sunday = 7) of an epoch day.
#[inline]
pub const fn epoch_days_to_week_day(epoch_days: i64) -> u8 {
    // 1970-01-01 was a Thursday
    ((epoch_days + 3).rem_euclid(7) + 1) as u8
}

/// Splits epoch milliseconds into epoch days and milliseconds into the day.
#[inline]
pub const fn epoch_ms_to_days_and_ms(epoch_ms: i64) -> (i64, i64) {
    (epoch_ms.div_euclid(MS_PER_DAY), epoch_ms.rem_euclid(MS_PER_DAY))
}
