//! The `tz_oracle` crate converts between UTC instants and historical wall
//! clock readings, and verifies literal test vectors against a table of
//! offset regimes.
//!
//! ```rust
//! use tz_oracle::{iso::LocalDateTime, ConversionResult, Oracle, RuleTable, TimeZone};
//!
//! let source = "Zone Asia/Aden 2:59:54 - LMT 1949 Dec 31 21:00\n\t3:00 - +03\n";
//! let table = RuleTable::from_zoneinfo_str(source).unwrap().table;
//!
//! let aden = TimeZone::try_from_table(&table, "Asia/Aden").unwrap();
//! let local = LocalDateTime::try_new(1950, 1, 1, 0, 0, 0).unwrap();
//! let utc = LocalDateTime::try_new(1949, 12, 31, 21, 0, 0).unwrap().to_instant_utc();
//! assert_eq!(aden.to_utc(&local).unwrap(), ConversionResult::Unique(utc));
//!
//! let verdict = Oracle::new(&table).verify("Asia/Aden", &local, utc).unwrap();
//! assert!(verdict.is_consistent());
//! ```
//!
//! Offset regimes are loaded by [`zonedata_rs`] from zoneinfo source text
//! or, with the `serde` feature, from JSON regime records.
#![no_std]
#![cfg_attr(not(test), forbid(clippy::unwrap_used))]
#![allow(
    clippy::module_name_repetitions,
    clippy::redundant_pub_crate,
    clippy::too_many_lines,
    clippy::missing_errors_doc,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap
)]

extern crate alloc;
extern crate core;

#[cfg(feature = "std")]
extern crate std;

pub mod error;
pub mod iso;
pub mod options;
pub mod oracle;
pub mod runner;
pub mod timezone;

#[cfg(feature = "serde")]
pub mod vectors;

#[doc(inline)]
pub use error::{ErrorKind, OracleError};

/// The `tz_oracle` result type
pub type OracleResult<T> = Result<T, OracleError>;

pub use crate::{
    oracle::{Direction, Mismatch, Oracle, Verdict},
    runner::{CaseRunner, Failure, RunOutcome, RunnerOptions, TestVector, ZoneCases},
    timezone::{ConversionResult, TimeZone},
};

pub use zonedata_rs::{
    Abbreviation, Instant, OffsetRegime, RuleTable, TableLoad, UtcOffsetMinutes, Zone,
    ZoneDataError,
};
