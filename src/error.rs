//! This module implements `OracleError`.

use alloc::borrow::Cow;
use core::fmt;

use zonedata_rs::ZoneDataError;

/// `OracleError`'s error type.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Error.
    #[default]
    Generic,
    /// An identifier that is neither a zone nor an alias of the table.
    UnknownZone,
    /// A zone failed validation while loading.
    MalformedRuleTable,
    /// A value outside of its valid range.
    Range,
    /// Malformed input data.
    Parse,
    /// An internal invariant did not hold.
    Assert,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Generic => "Error",
            Self::UnknownZone => "UnknownZone",
            Self::MalformedRuleTable => "MalformedRuleTable",
            Self::Range => "RangeError",
            Self::Parse => "ParseError",
            Self::Assert => "ImplementationError",
        })
    }
}

/// The error type for the conversion engine, oracle and runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleError {
    kind: ErrorKind,
    msg: Cow<'static, str>,
}

impl OracleError {
    #[inline]
    #[must_use]
    const fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            msg: Cow::Borrowed(""),
        }
    }

    /// Create a generic error
    #[inline]
    #[must_use]
    pub fn general<S>(msg: S) -> Self
    where
        S: Into<Cow<'static, str>>,
    {
        Self::new(ErrorKind::Generic).with_message(msg)
    }

    /// Create an unknown zone error.
    #[inline]
    #[must_use]
    pub const fn unknown_zone() -> Self {
        Self::new(ErrorKind::UnknownZone)
    }

    /// Create a malformed rule table error.
    #[inline]
    #[must_use]
    pub const fn malformed() -> Self {
        Self::new(ErrorKind::MalformedRuleTable)
    }

    /// Create a range error.
    #[inline]
    #[must_use]
    pub const fn range() -> Self {
        Self::new(ErrorKind::Range)
    }

    /// Create a parse error.
    #[inline]
    #[must_use]
    pub const fn parse() -> Self {
        Self::new(ErrorKind::Parse)
    }

    /// Creates an assertion error
    #[inline]
    #[must_use]
    pub const fn assert() -> Self {
        Self::new(ErrorKind::Assert)
    }

    /// Add a message to the error.
    #[inline]
    #[must_use]
    pub fn with_message<S>(mut self, msg: S) -> Self
    where
        S: Into<Cow<'static, str>>,
    {
        self.msg = msg.into();
        self
    }

    /// Returns this error's kind.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error message.
    #[inline]
    #[must_use]
    pub fn message(&self) -> &str {
        &self.msg
    }

    /// Extracts the error message.
    #[inline]
    #[must_use]
    pub fn into_message(self) -> Cow<'static, str> {
        self.msg
    }
}

impl fmt::Display for OracleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;

        let msg = self.msg.trim();
        if !msg.is_empty() {
            write!(f, ": {msg}")?;
        }

        Ok(())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for OracleError {}

impl From<ZoneDataError> for OracleError {
    fn from(value: ZoneDataError) -> Self {
        let err = match &value {
            ZoneDataError::UnknownZone(_) => Self::unknown_zone(),
            ZoneDataError::MalformedRuleTable { .. } => Self::malformed(),
            ZoneDataError::InvalidAbbreviation(_)
            | ZoneDataError::InvalidOffset(_)
            | ZoneDataError::InvalidInstant(_) => Self::range(),
            _ => Self::parse(),
        };
        err.with_message(alloc::format!("{value}"))
    }
}
