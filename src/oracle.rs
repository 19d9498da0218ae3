//! The verification oracle.
//!
//! The oracle decides whether a claimed `(local, utc, zone)` triple is
//! consistent. Both directions are checked:
//!
//!   1. `utc -> local`: the wall clock reading of `utc` must equal `local`
//!      field by field, weekday included.
//!   2. `local -> utc`: `local` must resolve to exactly `utc`. A gap or an
//!      overlap is a mismatch even when one of its candidates is `utc`.
//!
//! The first failing direction is reported.

use core::fmt;

use zonedata_rs::{Instant, RuleTable, UtcOffsetMinutes};

use crate::{
    iso::LocalDateTime,
    runner::TestVector,
    timezone::{ConversionResult, TimeZone},
    OracleResult,
};

/// The direction of a conversion check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    UtcToLocal,
    LocalToUtc,
    BaseOffset,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::UtcToLocal => "utc->local",
            Self::LocalToUtc => "local->utc",
            Self::BaseOffset => "base-offset",
        })
    }
}

/// A disagreement between a claimed value and the computed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mismatch {
    UtcToLocal {
        expected: LocalDateTime,
        actual: LocalDateTime,
    },
    LocalToUtc {
        expected: Instant,
        actual: ConversionResult,
    },
    BaseOffset {
        expected: UtcOffsetMinutes,
        actual: UtcOffsetMinutes,
    },
}

impl Mismatch {
    pub fn direction(&self) -> Direction {
        match self {
            Self::UtcToLocal { .. } => Direction::UtcToLocal,
            Self::LocalToUtc { .. } => Direction::LocalToUtc,
            Self::BaseOffset { .. } => Direction::BaseOffset,
        }
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.direction())?;
        match self {
            Self::UtcToLocal { expected, actual } => {
                write!(f, "expected {expected}, found {actual}")
            }
            Self::LocalToUtc { expected, actual } => {
                write!(f, "expected {expected}, found {actual}")
            }
            Self::BaseOffset { expected, actual } => {
                write!(f, "expected {expected}, found {actual}")
            }
        }
    }
}

/// The outcome of a single verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Consistent,
    Mismatch(Mismatch),
}

impl Verdict {
    #[inline]
    pub fn is_consistent(&self) -> bool {
        matches!(self, Self::Consistent)
    }
}

impl From<Option<Mismatch>> for Verdict {
    fn from(value: Option<Mismatch>) -> Self {
        value.map_or(Self::Consistent, Self::Mismatch)
    }
}

/// `Oracle` verifies wall clock claims against a [`RuleTable`].
#[derive(Debug, Clone, Copy)]
pub struct Oracle<'t> {
    table: &'t RuleTable,
}

impl<'t> Oracle<'t> {
    pub const fn new(table: &'t RuleTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &'t RuleTable {
        self.table
    }

    /// Checks that `local` is the wall clock reading of `utc` in `zone`, and
    /// that `local` resolves uniquely back to `utc`.
    ///
    /// Errors are reserved for unknown zones and out of range values; a
    /// disagreement is returned as [`Verdict::Mismatch`].
    pub fn verify(&self, zone: &str, local: &LocalDateTime, utc: Instant) -> OracleResult<Verdict> {
        TimeZone::try_from_table(self.table, zone)?.verify(local, utc)
    }

    /// Checks a [`TestVector`], including the expected base offset at its UTC instant.
    pub fn verify_vector(&self, zone: &str, vector: &TestVector) -> OracleResult<Verdict> {
        let tz = TimeZone::try_from_table(self.table, zone)?;
        verify_vector_in_zone(&tz, vector, true)
    }
}

pub(crate) fn verify_in_zone(
    tz: &TimeZone<'_>,
    local: &LocalDateTime,
    utc: Instant,
) -> OracleResult<Verdict> {
    let actual = tz.to_local(utc)?;
    if actual != *local {
        return Ok(Verdict::Mismatch(Mismatch::UtcToLocal {
            expected: *local,
            actual,
        }));
    }

    let resolved = tz.to_utc(local)?;
    if resolved != ConversionResult::Unique(utc) {
        return Ok(Verdict::Mismatch(Mismatch::LocalToUtc {
            expected: utc,
            actual: resolved,
        }));
    }

    Ok(Verdict::Consistent)
}

pub(crate) fn verify_vector_in_zone(
    tz: &TimeZone<'_>,
    vector: &TestVector,
    check_base_offset: bool,
) -> OracleResult<Verdict> {
    let utc = vector.utc.to_instant_utc();
    let verdict = verify_in_zone(tz, &vector.local, utc)?;
    if !verdict.is_consistent() || !check_base_offset {
        return Ok(verdict);
    }

    let actual = tz.base_offset_at(utc);
    Ok(Verdict::from(
        (actual != vector.expected_offset).then_some(Mismatch::BaseOffset {
            expected: vector.expected_offset,
            actual,
        }),
    ))
}
