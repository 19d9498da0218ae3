//! Implementation of the zoneinfo [`ZoneRecord`]

use core::{iter::Peekable, str::Lines};

use alloc::{borrow::ToOwned, string::String, vec::Vec};

use crate::{
    parser::{
        next_split, remove_comments, ContextParse, LineParseContext, TryFromStr, ZoneDataParseError,
    },
    regime::{OffsetRegime, Zone},
    types::{AbbreviationFormat, DstAmount, Time, UntilDateTime},
    Instant, ZoneDataError,
};

/// `ZoneEntry` represents a single row in a `ZoneRecord`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneEntry {
    /// Standard offset
    pub std_offset: Time,
    /// Daylight saving amount in use
    pub rule: DstAmount,
    /// Abbreviation format
    pub format: AbbreviationFormat,
    /// Date until
    pub date: Option<UntilDateTime>,
}

impl TryFromStr<LineParseContext> for ZoneEntry {
    type Error = ZoneDataParseError;
    fn try_from_str(s: &str, ctx: &mut LineParseContext) -> Result<Self, Self::Error> {
        ctx.enter("ZoneEntry");
        let mut splits = s.split_whitespace();
        let std_offset = next_split(&mut splits, ctx)?.context_parse::<Time>(ctx)?;
        let rule = next_split(&mut splits, ctx)?.context_parse::<DstAmount>(ctx)?;
        let format = next_split(&mut splits, ctx)?.context_parse::<AbbreviationFormat>(ctx)?;
        let datetime = splits.collect::<Vec<&str>>();
        let date = if datetime.is_empty() {
            None
        } else {
            Some(datetime.join(" ").context_parse::<UntilDateTime>(ctx)?)
        };

        ctx.exit();
        Ok(ZoneEntry {
            std_offset,
            rule,
            format,
            date,
        })
    }
}

/// A `Zone` line of zoneinfo source and its continuation lines, one
/// [`ZoneEntry`] per line. Every entry but the last carries an `UNTIL`.
///
/// For example, New York restricted to 2017:
///
/// ```txt
/// # Zone    NAME        STDOFF    RULES    FORMAT    [UNTIL]
/// Zone America/New_York    -5:00    -    EST    2017 Mar 12 2:00
///             -5:00    1:00    EDT    2017 Nov  5 2:00
///             -5:00    -    EST
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneRecord {
    pub entries: Vec<ZoneEntry>,
}

impl IntoIterator for ZoneRecord {
    type Item = ZoneEntry;
    type IntoIter = alloc::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl ZoneRecord {
    /// Parses a zone header line and all of its continuation lines.
    pub fn parse_full_table(
        lines: &mut Peekable<Lines<'_>>,
        ctx: &mut LineParseContext,
    ) -> Result<(String, Self), ZoneDataParseError> {
        ctx.enter("zone table");
        let header = lines
            .next()
            .ok_or(ZoneDataParseError::unexpected_eol(ctx))?;
        let (identifier, entry) = Self::parse_header_line(header, ctx)?;
        ctx.line_number += 1;
        let mut has_continuation_lines = entry.date.is_some();
        let mut table = Vec::from([entry]);
        while has_continuation_lines {
            let line = lines
                .next()
                .ok_or(ZoneDataParseError::unexpected_eol(ctx))?;
            let cleaned_line = remove_comments(line);
            if cleaned_line.trim().is_empty() {
                ctx.line_number += 1;
                continue;
            }
            let entry = ZoneEntry::try_from_str(cleaned_line, ctx)?;
            has_continuation_lines = entry.date.is_some();
            table.push(entry);
            ctx.line_number += 1;
        }

        ctx.exit();
        Ok((identifier, Self { entries: table }))
    }

    /// Parse a header line, i.e. the first zone record line.
    pub fn parse_header_line(
        header_line: &str,
        ctx: &mut LineParseContext,
    ) -> Result<(String, ZoneEntry), ZoneDataParseError> {
        ctx.enter("zone header");
        let cleaned = remove_comments(header_line);
        let mut splits = cleaned.split_ascii_whitespace();
        if splits.next() != Some("Zone") {
            return Err(ZoneDataParseError::InvalidZoneHeader(ctx.line_number));
        }
        let identifier = splits
            .next()
            .ok_or(ZoneDataParseError::MissingIdentifier(ctx.line_number))?;

        let zone_str = splits.collect::<Vec<&str>>().join(" ");
        let entry = ZoneEntry::try_from_str(&zone_str, ctx)?;
        ctx.exit();
        Ok((identifier.to_owned(), entry))
    }

    /// Resolves the record into a validated [`Zone`].
    ///
    /// Each entry becomes one offset regime. An entry's `UNTIL` is resolved
    /// against that entry's own offsets and becomes the `effective_from` of
    /// the following regime.
    pub fn to_zone(&self, identifier: &str) -> Result<Zone, ZoneDataError> {
        let mut regimes = Vec::with_capacity(self.entries.len());
        let mut effective_from = Instant::MIN;
        for entry in &self.entries {
            let standard = entry.std_offset.to_offset_minutes();
            let dst = entry.rule.to_offset_minutes();
            let total = standard + dst.unwrap_or_default();
            let is_dst = dst.is_some_and(|d| !d.is_zero());
            let abbreviation = entry.format.format(total, is_dst);
            regimes.push(OffsetRegime::try_new(
                effective_from,
                standard,
                dst,
                &abbreviation,
            )?);
            if let Some(until) = entry.date {
                effective_from =
                    Instant::from_epoch_milliseconds(until.to_epoch_milliseconds(standard, dst));
            }
        }
        Zone::try_new(identifier, regimes)
    }
}

#[cfg(test)]
mod tests {
    use alloc::borrow::ToOwned;

    use crate::{
        parser::LineParseContext,
        types::{
            AbbreviationFormat, Date, DayOfMonth, DstAmount, Month, QualifiedTime, Sign, Time,
            UntilDateTime,
        },
        utils, Instant, MalformedReason, UtcOffsetMinutes, ZoneDataError,
    };

    use super::{ZoneEntry, ZoneRecord};

    const NEW_YORK: &str = r#"Zone America/New_York	-5:00	-	EST	2017 Mar 12 2:00
			-5:00	1:00	EDT	2017 Nov  5 2:00 # fall back
			-5:00	-	EST"#;

    fn parse(src: &str) -> (alloc::string::String, ZoneRecord) {
        let mut lines = src.lines().peekable();
        let mut ctx = LineParseContext::default();
        ZoneRecord::parse_full_table(&mut lines, &mut ctx).unwrap()
    }

    #[test]
    fn new_york_table() {
        let (ident, table) = parse(NEW_YORK);
        assert_eq!(ident, "America/New_York");
        let mut table_iter = table.into_iter();
        assert_eq!(
            table_iter.next(),
            Some(ZoneEntry {
                std_offset: Time {
                    sign: Sign::Negative,
                    hour: 5,
                    minute: 0,
                    second: 0,
                },
                rule: DstAmount::None,
                format: AbbreviationFormat::String("EST".to_owned()),
                date: Some(UntilDateTime {
                    date: Date {
                        year: 2017,
                        month: Month::Mar,
                        day: DayOfMonth::Day(12),
                    },
                    time: QualifiedTime::Local(Time {
                        sign: Sign::Positive,
                        hour: 2,
                        minute: 0,
                        second: 0,
                    }),
                }),
            })
        );
        assert!(table_iter.next().is_some());
        assert_eq!(table_iter.next().map(|e| e.date), Some(None));
        assert!(table_iter.next().is_none());
    }

    #[test]
    fn new_york_regimes() {
        let (ident, table) = parse(NEW_YORK);
        let zone = table.to_zone(&ident).unwrap();
        let regimes = zone.regimes();
        assert_eq!(regimes.len(), 3);
        assert_eq!(regimes[0].effective_from, Instant::MIN);

        // 2017-03-12T02:00 EST is 07:00 UTC
        let spring = utils::epoch_days_from_gregorian_date(2017, 3, 12) * utils::MS_PER_DAY
            + 7 * utils::MS_PER_HOUR;
        assert_eq!(regimes[1].effective_from.as_epoch_milliseconds(), spring);
        assert_eq!(regimes[1].total_offset(), UtcOffsetMinutes(-240));
        assert_eq!(regimes[1].abbreviation(), "EDT");
        assert!(regimes[1].is_dst());

        // 2017-11-05T02:00 EDT is 06:00 UTC
        let fall = utils::epoch_days_from_gregorian_date(2017, 11, 5) * utils::MS_PER_DAY
            + 6 * utils::MS_PER_HOUR;
        assert_eq!(regimes[2].effective_from.as_epoch_milliseconds(), fall);
        assert_eq!(regimes[2].standard_offset, UtcOffsetMinutes(-300));
        assert_eq!(regimes[2].dst_offset, None);
    }

    #[test]
    fn lmt_regime() {
        let (ident, table) = parse("Zone Asia/Aden 2:59:54 - LMT 1949 Dec 31 21:00\n 3:00 - +03");
        let zone = table.to_zone(&ident).unwrap();
        let regimes = zone.regimes();
        assert_eq!(regimes[0].standard_offset, UtcOffsetMinutes(180));
        assert_eq!(regimes[0].abbreviation(), "LMT");
        // 1949-12-31T18:00Z
        assert_eq!(
            regimes[1].effective_from.as_epoch_milliseconds(),
            -7306 * utils::MS_PER_DAY + 18 * utils::MS_PER_HOUR
        );
        assert_eq!(regimes[1].abbreviation(), "+03");
    }

    #[test]
    fn numeric_abbreviation() {
        let (ident, table) = parse("Zone Etc/Test -9:30 - %z");
        let zone = table.to_zone(&ident).unwrap();
        assert_eq!(zone.regimes()[0].abbreviation(), "-0930");
    }

    #[test]
    fn repeated_until_is_malformed() {
        let (ident, table) = parse(concat!(
            "Zone Test/Repeat 1:00 - AAA 2000 Jan 1 0:00u\n",
            " 2:00 - BBB 2000 Jan 1 0:00u\n",
            " 3:00 - CCC",
        ));
        let err = table.to_zone(&ident).unwrap_err();
        assert!(matches!(
            err,
            ZoneDataError::MalformedRuleTable {
                reason: MalformedReason::NonMonotonic { index: 2 },
                ..
            }
        ));
    }
}
