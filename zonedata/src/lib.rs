//! Historical time zone offset data.
//!
//! `zonedata_rs` models the offset history of a time zone as an ordered list
//! of [`OffsetRegime`]s, each of which holds a constant standard offset,
//! daylight saving amount and abbreviation from its `effective_from` instant
//! until the next regime begins. A [`RuleTable`] is an arena of such
//! [`Zone`]s with identifier and alias lookup.
//!
//! Tables are immutable once built and may be loaded from:
//!
//!   - zoneinfo-style source text (`Zone` and `Link` lines with a fixed or
//!     absent daylight saving amount)
//!   - JSON regime records (requires the `serde` feature)
//!
//! ```rust
//! use zonedata_rs::{Instant, RuleTable, UtcOffsetMinutes};
//!
//! let src = "Zone Asia/Aden 2:59:54 - LMT 1949 Dec 31 21:00\n 3:00 - +03\n";
//! let load = RuleTable::from_zoneinfo_str(src).unwrap();
//! assert!(load.rejected.is_empty());
//!
//! let regime = load
//!     .table
//!     .regime_at("Asia/Aden", Instant::from_epoch_milliseconds(0))
//!     .unwrap();
//! assert_eq!(regime.total_offset(), UtcOffsetMinutes(180));
//! assert_eq!(regime.abbreviation(), "+03");
//! ```

// Implementation note: LMT offsets are stored rounded to whole minutes, so a
// table never carries sub-minute offsets.

#![no_std]
#![cfg_attr(not(test), forbid(clippy::unwrap_used))]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

use core::fmt;

use alloc::string::String;

mod instant;
#[cfg(feature = "serde")]
mod json;
mod regime;
mod table;

pub mod parser;
pub mod types;
pub mod utils;
pub mod zone;

pub use instant::{Instant, UtcOffsetMinutes, MS_MAX_INSTANT, MS_MIN_INSTANT};
#[cfg(feature = "serde")]
pub use json::{RegimeRecord, ZoneRecords, ZoneRegimes};
pub use parser::ZoneDataParseError;
pub use regime::{Abbreviation, MalformedReason, OffsetRegime, Zone};
pub use table::{RuleTable, TableLoad};

/// The general error type for `zonedata_rs` operations
#[derive(Debug)]
pub enum ZoneDataError {
    /// The identifier is neither a registered zone nor an alias.
    UnknownZone(String),
    /// A zone failed validation.
    MalformedRuleTable {
        zone: String,
        reason: MalformedReason,
    },
    /// An abbreviation was empty, too long or not ASCII.
    InvalidAbbreviation(String),
    /// A standard or total offset, in minutes, is 24 hours or more from UTC.
    InvalidOffset(i64),
    /// An `effective_from`, in epoch milliseconds, is outside the instant range.
    InvalidInstant(i64),
    Parse(ZoneDataParseError),
    #[cfg(feature = "serde")]
    Json(String),
    #[cfg(feature = "std")]
    Io(std::io::Error),
}

impl ZoneDataError {
    pub(crate) fn malformed(zone: String, reason: MalformedReason) -> Self {
        Self::MalformedRuleTable { zone, reason }
    }
}

impl fmt::Display for ZoneDataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownZone(id) => write!(f, "unknown time zone `{id}`"),
            Self::MalformedRuleTable { zone, reason } => {
                write!(f, "malformed rule table for `{zone}`: {reason}")
            }
            Self::InvalidAbbreviation(abbr) => write!(f, "invalid abbreviation `{abbr}`"),
            Self::InvalidOffset(minutes) => {
                write!(f, "offset of {minutes} minutes is out of range")
            }
            Self::InvalidInstant(ms) => write!(f, "instant {ms} is out of range"),
            Self::Parse(err) => write!(f, "zoneinfo parse error: {err}"),
            #[cfg(feature = "serde")]
            Self::Json(err) => write!(f, "json error: {err}"),
            #[cfg(feature = "std")]
            Self::Io(err) => write!(f, "io error: {err}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ZoneDataError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ZoneDataParseError> for ZoneDataError {
    fn from(value: ZoneDataParseError) -> Self {
        Self::Parse(value)
    }
}

#[cfg(feature = "std")]
impl From<std::io::Error> for ZoneDataError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}
