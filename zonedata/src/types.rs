//! Zoneinfo source types

use alloc::{borrow::ToOwned, format, string::String};

use crate::{
    parser::{next_split, ContextParse, LineParseContext, TryFromStr, ZoneDataParseError},
    utils::{self, MS_PER_SECOND},
    UtcOffsetMinutes,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Time {
    pub sign: Sign,
    pub hour: i8,
    pub minute: i8,
    pub second: i8,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(i8)]
pub enum Sign {
    #[default]
    Positive = 1,
    Negative = -1,
}

impl Time {
    pub const fn as_secs(&self) -> i64 {
        (self.hour as i64 * 3600 + self.minute as i64 * 60 + self.second as i64) * self.sign as i64
    }

    /// Returns this time as an offset in whole minutes.
    ///
    /// Seconds are rounded to the nearest minute, half away from zero.
    pub const fn to_offset_minutes(&self) -> UtcOffsetMinutes {
        let abs = self.as_secs().abs();
        let minutes = (abs + 30) / 60;
        UtcOffsetMinutes((minutes * self.sign as i64) as i32)
    }
}

impl TryFromStr<LineParseContext> for Time {
    type Error = ZoneDataParseError;
    fn try_from_str(s: &str, ctx: &mut LineParseContext) -> Result<Self, Self::Error> {
        ctx.enter("Time");
        let (s, sign) = if let Some(stripped) = s.strip_prefix('-') {
            (stripped, Sign::Negative)
        } else {
            (s, Sign::Positive)
        };
        let mut parts = s.splitn(3, ':');
        let hour = parts
            .next()
            .ok_or(ZoneDataParseError::unknown_value(ctx, s))?
            .context_parse::<i8>(ctx)?;
        let minute = parts
            .next()
            .map(|m| m.context_parse::<i8>(ctx))
            .transpose()?
            .unwrap_or(0);
        let second = parts
            .next()
            .map(|sec| sec.context_parse::<i8>(ctx))
            .transpose()?
            .unwrap_or(0);
        if !(0..60).contains(&minute) || !(0..60).contains(&second) {
            return Err(ZoneDataParseError::unknown_value(ctx, s));
        }
        ctx.exit();
        Ok(Self {
            sign,
            hour,
            minute,
            second,
        })
    }
}

/// The `RULES` column of a zone line.
///
/// Only the unnamed forms are supported; a named rule set requires rule
/// compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DstAmount {
    /// `-`: standard time applies.
    None,
    /// A fixed amount of daylight saving time, e.g. `1:00`.
    Fixed(Time),
}

impl DstAmount {
    pub fn to_offset_minutes(&self) -> Option<UtcOffsetMinutes> {
        match self {
            Self::None => None,
            Self::Fixed(time) => Some(time.to_offset_minutes()),
        }
    }
}

impl TryFromStr<LineParseContext> for DstAmount {
    type Error = ZoneDataParseError;
    fn try_from_str(s: &str, ctx: &mut LineParseContext) -> Result<Self, Self::Error> {
        ctx.enter("Rules");
        if s == "-" {
            ctx.exit();
            return Ok(Self::None);
        }
        let numeric = s
            .trim_start_matches('-')
            .starts_with(|c: char| c.is_ascii_digit());
        if !numeric {
            return Err(ZoneDataParseError::UnsupportedRule(
                ctx.line_number,
                s.to_owned(),
            ));
        }
        let time = s.context_parse::<Time>(ctx)?;
        ctx.exit();
        Ok(Self::Fixed(time))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbbreviationFormat {
    String(String),
    Numeric,
    Pair(String, String),
    Formattable(String),
}

impl AbbreviationFormat {
    /// Formats the abbreviation for a total offset in minutes.
    ///
    /// Without a named rule there is no letter to substitute, so `%s` expands
    /// to the empty string.
    pub fn format(&self, offset: UtcOffsetMinutes, is_dst: bool) -> String {
        match self {
            Self::String(s) => s.clone(),
            Self::Formattable(s) => s.replace("%s", ""),
            Self::Pair(std, dst) => {
                if is_dst {
                    dst.clone()
                } else {
                    std.clone()
                }
            }
            Self::Numeric => offset_to_str(offset),
        }
    }
}

fn offset_to_str(offset: UtcOffsetMinutes) -> String {
    let sign = if offset.0 < 0 { '-' } else { '+' };
    let abs = offset.0.unsigned_abs();
    let (hour, minute) = (abs / 60, abs % 60);
    if minute > 0 {
        format!("{sign}{hour:02}{minute:02}")
    } else {
        format!("{sign}{hour:02}")
    }
}

impl TryFromStr<LineParseContext> for AbbreviationFormat {
    type Error = ZoneDataParseError;
    fn try_from_str(s: &str, ctx: &mut LineParseContext) -> Result<Self, Self::Error> {
        ctx.enter("Abbr. Format");
        let value = if s.contains("%s") {
            Ok(Self::Formattable(s.to_owned()))
        } else if s.contains("%z") {
            Ok(Self::Numeric)
        } else if let Some((std, dst)) = s.split_once('/') {
            Ok(Self::Pair(std.to_owned(), dst.to_owned()))
        } else {
            Ok(AbbreviationFormat::String(s.to_owned()))
        };
        ctx.exit();
        value
    }
}

/// The `[UNTIL]` column of a zone line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UntilDateTime {
    pub date: Date,
    pub time: QualifiedTime,
}

impl UntilDateTime {
    /// Resolves the until date time to epoch milliseconds using the offsets
    /// of the line it terminates.
    pub fn to_epoch_milliseconds(
        &self,
        standard: UtcOffsetMinutes,
        dst: Option<UtcOffsetMinutes>,
    ) -> i64 {
        let date_ms = self.date.epoch_days() * utils::MS_PER_DAY;
        date_ms + self.time.to_universal_milliseconds(standard, dst)
    }
}

impl TryFromStr<LineParseContext> for UntilDateTime {
    type Error = ZoneDataParseError;
    fn try_from_str(s: &str, ctx: &mut LineParseContext) -> Result<Self, Self::Error> {
        ctx.enter("UntilDateTime");
        let mut splits = s.split_whitespace();
        let year = next_split(&mut splits, ctx)?.context_parse::<i32>(ctx)?;
        let month = splits
            .next()
            .map(|m| m.context_parse::<Month>(ctx))
            .transpose()?
            .unwrap_or(Month::Jan);
        let day = splits
            .next()
            .map(|d| d.context_parse::<DayOfMonth>(ctx))
            .transpose()?
            .unwrap_or(DayOfMonth::Day(1));
        let time = splits
            .next()
            .map(|t| t.context_parse::<QualifiedTime>(ctx))
            .transpose()?
            .unwrap_or(QualifiedTime::Local(Time::default()));
        if let Some(extra) = splits.next() {
            return Err(ZoneDataParseError::unknown_value(ctx, extra));
        }
        let date = Date { year, month, day };
        if !date.is_valid() {
            return Err(ZoneDataParseError::unknown_value(ctx, s));
        }
        ctx.exit();
        Ok(Self { date, time })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Date {
    pub year: i32,
    pub month: Month,
    pub day: DayOfMonth,
}

impl Date {
    fn is_valid(&self) -> bool {
        if !(utils::MIN_YEAR..=utils::MAX_YEAR).contains(&self.year) {
            return false;
        }
        let days_in_month = utils::iso_days_in_month(self.year, self.month as u8);
        match self.day {
            DayOfMonth::Last(_) => true,
            DayOfMonth::WeekDayGEThanMonthDay(_, d)
            | DayOfMonth::WeekDayLEThanMonthDay(_, d)
            | DayOfMonth::Day(d) => (1..=days_in_month).contains(&d),
        }
    }

    /// Returns the epoch days of this date, resolving any week day selector.
    pub fn epoch_days(&self) -> i64 {
        let first = utils::epoch_days_from_gregorian_date(self.year, self.month as u8, 1);
        match self.day {
            DayOfMonth::Last(week_day) => {
                let last = first + utils::iso_days_in_month(self.year, self.month as u8) as i64 - 1;
                let back = (utils::epoch_days_to_week_day(last) as i64 - week_day as i64)
                    .rem_euclid(7);
                last - back
            }
            DayOfMonth::WeekDayGEThanMonthDay(week_day, d) => {
                let start = first + d as i64 - 1;
                let forward = (week_day as i64 - utils::epoch_days_to_week_day(start) as i64)
                    .rem_euclid(7);
                start + forward
            }
            DayOfMonth::WeekDayLEThanMonthDay(week_day, d) => {
                let start = first + d as i64 - 1;
                let back = (utils::epoch_days_to_week_day(start) as i64 - week_day as i64)
                    .rem_euclid(7);
                start - back
            }
            DayOfMonth::Day(d) => first + d as i64 - 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Month {
    Jan = 1,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl TryFromStr<LineParseContext> for Month {
    type Error = ZoneDataParseError;
    fn try_from_str(s: &str, ctx: &mut LineParseContext) -> Result<Self, Self::Error> {
        ctx.enter("Month");
        let result = match s {
            "Jan" => Ok(Self::Jan),
            "Feb" => Ok(Self::Feb),
            "Mar" => Ok(Self::Mar),
            "Apr" => Ok(Self::Apr),
            "May" => Ok(Self::May),
            "Jun" => Ok(Self::Jun),
            "Jul" => Ok(Self::Jul),
            "Aug" => Ok(Self::Aug),
            "Sep" => Ok(Self::Sep),
            "Oct" => Ok(Self::Oct),
            "Nov" => Ok(Self::Nov),
            "Dec" => Ok(Self::Dec),
            _ => Err(ZoneDataParseError::unknown_value(ctx, s)),
        };
        ctx.exit();
        result
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayOfMonth {
    Last(WeekDay),
    WeekDayGEThanMonthDay(WeekDay, u8),
    WeekDayLEThanMonthDay(WeekDay, u8),
    Day(u8),
}

impl TryFromStr<LineParseContext> for DayOfMonth {
    type Error = ZoneDataParseError;
    fn try_from_str(s: &str, ctx: &mut LineParseContext) -> Result<Self, Self::Error> {
        ctx.enter("DayOfMonth");
        let result = if let Some(weekday) = s.strip_prefix("last") {
            weekday.context_parse(ctx).map(DayOfMonth::Last)
        } else if s.contains(">=") {
            parse_date_split(s, ">=", ctx)
                .map(|(week_day, day)| DayOfMonth::WeekDayGEThanMonthDay(week_day, day))
        } else if s.contains("<=") {
            parse_date_split(s, "<=", ctx)
                .map(|(week_day, day)| DayOfMonth::WeekDayLEThanMonthDay(week_day, day))
        } else {
            s.context_parse(ctx).map(DayOfMonth::Day)
        };
        ctx.exit();
        result
    }
}

fn parse_date_split(
    s: &str,
    pat: &str,
    ctx: &mut LineParseContext,
) -> Result<(WeekDay, u8), ZoneDataParseError> {
    let (week_day, num) = s
        .split_once(pat)
        .ok_or(ZoneDataParseError::unknown_value(ctx, s))?;
    let w = week_day.context_parse::<WeekDay>(ctx)?;
    let d = num.context_parse(ctx)?;
    Ok((w, d))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WeekDay {
    Mon = 1,
    Tues,
    Wed,
    Thurs,
    Fri,
    Sat,
    Sun,
}

impl TryFromStr<LineParseContext> for WeekDay {
    type Error = ZoneDataParseError;
    fn try_from_str(s: &str, ctx: &mut LineParseContext) -> Result<Self, Self::Error> {
        match s {
            "Mon" => Ok(Self::Mon),
            "Tue" | "Tues" => Ok(Self::Tues),
            "Wed" => Ok(Self::Wed),
            "Thu" | "Thurs" => Ok(Self::Thurs),
            "Fri" => Ok(Self::Fri),
            "Sat" => Ok(Self::Sat),
            "Sun" => Ok(Self::Sun),
            _ => Err(ZoneDataParseError::unknown_value(ctx, s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualifiedTime {
    /// Wall clock time, including any daylight saving amount
    Local(Time),
    /// Local standard time
    Standard(Time),
    Universal(Time),
}

impl QualifiedTime {
    /// Returns universal milliseconds into the day.
    pub fn to_universal_milliseconds(
        &self,
        standard: UtcOffsetMinutes,
        dst: Option<UtcOffsetMinutes>,
    ) -> i64 {
        let dst = dst.unwrap_or_default();
        match self {
            Self::Local(t) => {
                t.as_secs() * MS_PER_SECOND - standard.as_milliseconds() - dst.as_milliseconds()
            }
            Self::Standard(t) => t.as_secs() * MS_PER_SECOND - standard.as_milliseconds(),
            Self::Universal(t) => t.as_secs() * MS_PER_SECOND,
        }
    }
}

impl TryFromStr<LineParseContext> for QualifiedTime {
    type Error = ZoneDataParseError;
    fn try_from_str(s: &str, ctx: &mut LineParseContext) -> Result<Self, Self::Error> {
        if let Some(time) = s.strip_suffix('s') {
            time.context_parse::<Time>(ctx).map(Self::Standard)
        } else if let Some(time) = s
            .strip_suffix('u')
            .or_else(|| s.strip_suffix('g'))
            .or_else(|| s.strip_suffix('z'))
        {
            time.context_parse::<Time>(ctx).map(Self::Universal)
        } else if let Some(time) = s.strip_suffix('w') {
            time.context_parse::<Time>(ctx).map(Self::Local)
        } else {
            s.context_parse::<Time>(ctx).map(Self::Local)
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::borrow::ToOwned;

    use super::*;
    use crate::parser::LineParseContext;

    fn parse<T: TryFromStr<LineParseContext, Error = ZoneDataParseError>>(s: &str) -> T {
        s.context_parse::<T>(&mut LineParseContext::default())
            .unwrap()
    }

    #[test]
    fn lmt_offsets_round_half_away_from_zero() {
        assert_eq!(parse::<Time>("2:59:54").to_offset_minutes(), UtcOffsetMinutes(180));
        assert_eq!(parse::<Time>("-5:50:36").to_offset_minutes(), UtcOffsetMinutes(-351));
        assert_eq!(parse::<Time>("0:00:30").to_offset_minutes(), UtcOffsetMinutes(1));
        assert_eq!(parse::<Time>("-0:00:30").to_offset_minutes(), UtcOffsetMinutes(-1));
        assert_eq!(parse::<Time>("0:00:29").to_offset_minutes(), UtcOffsetMinutes(0));
        assert_eq!(parse::<Time>("13").to_offset_minutes(), UtcOffsetMinutes(780));
    }

    #[test]
    fn dst_amounts() {
        assert_eq!(parse::<DstAmount>("-"), DstAmount::None);
        assert_eq!(
            parse::<DstAmount>("1:00").to_offset_minutes(),
            Some(UtcOffsetMinutes(60))
        );
        let err = "US"
            .context_parse::<DstAmount>(&mut LineParseContext::default())
            .unwrap_err();
        assert!(matches!(err, ZoneDataParseError::UnsupportedRule(1, rule) if rule == "US"));
    }

    #[test]
    fn abbr_formatting() {
        let abbr = AbbreviationFormat::Numeric.format(UtcOffsetMinutes(180), false);
        assert_eq!(abbr, "+03");

        let abbr = AbbreviationFormat::Numeric.format(UtcOffsetMinutes(-570), false);
        assert_eq!(abbr, "-0930");

        let abbr = AbbreviationFormat::Pair("CST".to_owned(), "CDT".to_owned())
            .format(UtcOffsetMinutes(-300), true);
        assert_eq!(abbr, "CDT");

        let abbr = AbbreviationFormat::Formattable("GMT%s".to_owned())
            .format(UtcOffsetMinutes::ZERO, false);
        assert_eq!(abbr, "GMT");
    }

    #[test]
    fn until_qualifiers() {
        let standard = UtcOffsetMinutes(-300);
        let dst = Some(UtcOffsetMinutes(60));
        let base = utils::epoch_days_from_gregorian_date(2017, 11, 5) * utils::MS_PER_DAY;

        let wall = parse::<UntilDateTime>("2017 Nov 5 2:00");
        assert_eq!(wall.to_epoch_milliseconds(standard, dst), base + 6 * utils::MS_PER_HOUR);

        let std = parse::<UntilDateTime>("2017 Nov 5 2:00s");
        assert_eq!(std.to_epoch_milliseconds(standard, dst), base + 7 * utils::MS_PER_HOUR);

        let universal = parse::<UntilDateTime>("2017 Nov 5 2:00u");
        assert_eq!(universal.to_epoch_milliseconds(standard, dst), base + 2 * utils::MS_PER_HOUR);
    }

    #[test]
    fn until_date_selectors() {
        // 2017-03-12 is the second Sunday of March
        let date = parse::<UntilDateTime>("2017 Mar Sun>=8").date;
        assert_eq!(date.epoch_days(), utils::epoch_days_from_gregorian_date(2017, 3, 12));

        let date = parse::<UntilDateTime>("2017 Oct lastSun").date;
        assert_eq!(date.epoch_days(), utils::epoch_days_from_gregorian_date(2017, 10, 29));

        let date = parse::<UntilDateTime>("2017 Oct Sun<=7").date;
        assert_eq!(date.epoch_days(), utils::epoch_days_from_gregorian_date(2017, 10, 1));

        let date = parse::<UntilDateTime>("1950").date;
        assert_eq!(date.epoch_days(), -7305);
    }

    #[test]
    fn invalid_until_day() {
        let err = "2017 Feb 30"
            .context_parse::<UntilDateTime>(&mut LineParseContext::default())
            .unwrap_err();
        assert!(matches!(err, ZoneDataParseError::UnknownValue(..)));
    }

    #[test]
    fn until_year_out_of_range() {
        for until in ["2147483647", "-2147483648 Jan 1", "275761"] {
            let err = until
                .context_parse::<UntilDateTime>(&mut LineParseContext::default())
                .unwrap_err();
            assert!(matches!(err, ZoneDataParseError::UnknownValue(..)), "{until}");
        }
        assert!("275760 Dec 31"
            .context_parse::<UntilDateTime>(&mut LineParseContext::default())
            .is_ok());
    }
}
