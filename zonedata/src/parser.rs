//! Zoneinfo-style source parsing

use core::{
    fmt,
    iter::Peekable,
    num::ParseIntError,
    str::{Lines, SplitWhitespace},
};

use alloc::{borrow::ToOwned, string::String, vec, vec::Vec};

use crate::zone::ZoneRecord;

/// A line numbered error produced while parsing zoneinfo source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneDataParseError {
    InvalidZoneHeader(u32),
    MissingIdentifier(u32),
    UnexpectedEndOfLine(u32, &'static str),
    UnknownValue(u32, String),
    ParseIntError(u32, ParseIntError, &'static str),
    /// A named rule set was referenced by a zone or defined by a `Rule` line.
    UnsupportedRule(u32, String),
}

impl ZoneDataParseError {
    pub(crate) fn unexpected_eol(ctx: &LineParseContext) -> Self {
        Self::UnexpectedEndOfLine(ctx.line_number, ctx.span())
    }

    pub(crate) fn unknown_value(ctx: &LineParseContext, value: &str) -> Self {
        Self::UnknownValue(ctx.line_number, value.to_owned())
    }

    /// The line number the error was found on.
    pub fn line_number(&self) -> u32 {
        match self {
            Self::InvalidZoneHeader(line)
            | Self::MissingIdentifier(line)
            | Self::UnexpectedEndOfLine(line, _)
            | Self::UnknownValue(line, _)
            | Self::ParseIntError(line, ..)
            | Self::UnsupportedRule(line, _) => *line,
        }
    }
}

impl fmt::Display for ZoneDataParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidZoneHeader(line) => write!(f, "line {line}: invalid zone header"),
            Self::MissingIdentifier(line) => write!(f, "line {line}: missing zone identifier"),
            Self::UnexpectedEndOfLine(line, span) => {
                write!(f, "line {line}: unexpected end of line while parsing {span}")
            }
            Self::UnknownValue(line, value) => write!(f, "line {line}: unknown value `{value}`"),
            Self::ParseIntError(line, err, span) => {
                write!(f, "line {line}: {err} while parsing {span}")
            }
            Self::UnsupportedRule(line, rule) => {
                write!(f, "line {line}: named rule `{rule}` is not supported")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ZoneDataParseError {}

pub trait TryFromStr<C>: Sized {
    type Error;
    fn try_from_str(s: &str, context: &mut C) -> Result<Self, Self::Error>;
}

#[derive(Debug, Clone)]
pub struct LineParseContext {
    pub line_number: u32,
    pub spans: Vec<&'static str>,
}

impl LineParseContext {
    pub fn enter(&mut self, name: &'static str) {
        self.spans.push(name);
    }

    pub fn span(&self) -> &'static str {
        self.spans.last().copied().unwrap_or("undefined")
    }

    pub fn exit(&mut self) {
        self.spans.pop();
    }
}

impl Default for LineParseContext {
    fn default() -> Self {
        Self {
            line_number: 1,
            spans: vec!["undefined"],
        }
    }
}

pub trait ContextParse {
    fn context_parse<T: TryFromStr<LineParseContext>>(
        &self,
        ctx: &mut LineParseContext,
    ) -> Result<T, <T as TryFromStr<LineParseContext>>::Error>;
}

impl ContextParse for &str {
    fn context_parse<T: TryFromStr<LineParseContext>>(
        &self,
        ctx: &mut LineParseContext,
    ) -> Result<T, <T as TryFromStr<LineParseContext>>::Error> {
        T::try_from_str(self, ctx)
    }
}

impl ContextParse for String {
    fn context_parse<T: TryFromStr<LineParseContext>>(
        &self,
        ctx: &mut LineParseContext,
    ) -> Result<T, <T as TryFromStr<LineParseContext>>::Error> {
        T::try_from_str(self, ctx)
    }
}

macro_rules! int_from_str {
    ($($int:ty),*) => {
        $(
            impl TryFromStr<LineParseContext> for $int {
                type Error = ZoneDataParseError;
                fn try_from_str(s: &str, ctx: &mut LineParseContext) -> Result<Self, Self::Error> {
                    s.parse::<$int>().map_err(|e| {
                        ZoneDataParseError::ParseIntError(ctx.line_number, e, ctx.span())
                    })
                }
            }
        )*
    };
}

int_from_str!(i8, u8, i32);

pub(crate) fn next_split<'a>(
    splits: &mut SplitWhitespace<'a>,
    context: &LineParseContext,
) -> Result<&'a str, ZoneDataParseError> {
    splits
        .next()
        .ok_or(ZoneDataParseError::unexpected_eol(context))
}

pub(crate) fn remove_comments(line: &str) -> &str {
    if let Some((cleaned, _comment)) = line.split_once('#') {
        cleaned
    } else {
        line
    }
}

/// The parsed contents of a zoneinfo-style source.
#[derive(Debug, Clone, Default)]
pub struct ZoneSource {
    /// Zone records in source order.
    pub zones: Vec<(String, ZoneRecord)>,
    /// `(alias, target)` pairs from `Link` lines.
    pub links: Vec<(String, String)>,
}

#[non_exhaustive]
pub struct ZoneDataParser<'data> {
    lines: Peekable<Lines<'data>>,
}

impl<'data> ZoneDataParser<'data> {
    /// Creates a parser from a `&str`
    pub fn from_zoneinfo_str(source: &'data str) -> Self {
        Self {
            lines: source.lines().peekable(),
        }
    }

    pub fn parse(&mut self) -> Result<ZoneSource, ZoneDataParseError> {
        let mut source = ZoneSource::default();
        let mut context = LineParseContext::default();
        while let Some(&line) = self.lines.peek() {
            let cleaned = remove_comments(line);
            let mut splits = cleaned.split_whitespace();
            match splits.next() {
                None => {}
                Some("Zone") => {
                    // The zone table consumes its own lines.
                    let (identifier, record) =
                        ZoneRecord::parse_full_table(&mut self.lines, &mut context)?;
                    source.zones.push((identifier, record));
                    continue;
                }
                Some("Link") => {
                    context.enter("Link");
                    let target = next_split(&mut splits, &context)?;
                    let alias = next_split(&mut splits, &context)?;
                    source.links.push((alias.to_owned(), target.to_owned()));
                    context.exit();
                }
                Some("Rule") => {
                    context.enter("Rule");
                    let name = next_split(&mut splits, &context)?;
                    return Err(ZoneDataParseError::UnsupportedRule(
                        context.line_number,
                        name.to_owned(),
                    ));
                }
                Some(other) => return Err(ZoneDataParseError::unknown_value(&context, other)),
            }
            self.lines.next();
            context.line_number += 1;
        }
        Ok(source)
    }
}

#[cfg(test)]
mod tests {
    use super::{ZoneDataParseError, ZoneDataParser};

    const SOURCE: &str = r#"
# Zone	NAME		STDOFF	RULES	FORMAT	[UNTIL]
Zone	Asia/Aden	2:59:54	-	LMT	1949 Dec 31 21:00
			3:00	-	+03

Link	Asia/Aden	Asia/Yemen # an alias
"#;

    #[test]
    fn parse_source() {
        let source = ZoneDataParser::from_zoneinfo_str(SOURCE).parse().unwrap();
        assert_eq!(source.zones.len(), 1);
        let (identifier, record) = &source.zones[0];
        assert_eq!(identifier, "Asia/Aden");
        assert_eq!(record.entries.len(), 2);
        assert_eq!(
            source.links,
            [("Asia/Yemen".into(), "Asia/Aden".into())]
        );
    }

    #[test]
    fn rule_lines_are_rejected() {
        let src = "Rule\tUS\t1967\t2006\t-\tOct\tlastSun\t2:00\t0\tS\n";
        let err = ZoneDataParser::from_zoneinfo_str(src).parse().unwrap_err();
        assert_eq!(err, ZoneDataParseError::UnsupportedRule(1, "US".into()));
    }

    #[test]
    fn error_line_numbers() {
        let src = "# header\n\nZone Test/Zone 1:00 - TST 2000\n\t2:00 - TST2 2001 Foo\n";
        let err = ZoneDataParser::from_zoneinfo_str(src).parse().unwrap_err();
        assert_eq!(err.line_number(), 4);
        assert!(matches!(err, ZoneDataParseError::UnknownValue(4, ref v) if v == "Foo"));

        let src = "Zone Test/Zone 1:00 - TST 2000\n";
        let err = ZoneDataParser::from_zoneinfo_str(src).parse().unwrap_err();
        assert!(matches!(err, ZoneDataParseError::UnexpectedEndOfLine(2, _)));

        let err = ZoneDataParser::from_zoneinfo_str("Leap 2016 Dec 31 23:59:60 + S\n")
            .parse()
            .unwrap_err();
        assert_eq!(err, ZoneDataParseError::UnknownValue(1, "Leap".into()));
    }
}
