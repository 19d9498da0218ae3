//! The conversion engine between instants and wall clock readings.

use core::{fmt, ops::Range};

use alloc::vec::Vec;
use zonedata_rs::{Instant, OffsetRegime, RuleTable, UtcOffsetMinutes, Zone};

use crate::{
    iso::LocalDateTime,
    oracle::{self, Verdict},
    options::Disambiguation,
    OracleError, OracleResult,
};

/// The result of resolving a wall clock reading to UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionResult {
    /// The reading occurs exactly once.
    Unique(Instant),
    /// The reading was skipped by a forward transition.
    ///
    /// `earlier` interprets the reading with the offset after the transition,
    /// `later` with the offset before it.
    Gap { earlier: Instant, later: Instant },
    /// The reading occurs more than once, first at `earlier` and last at `later`.
    Overlap { earlier: Instant, later: Instant },
}

impl ConversionResult {
    #[inline]
    pub fn is_unique(&self) -> bool {
        matches!(self, Self::Unique(_))
    }

    /// Returns the instant if the reading is unique.
    #[inline]
    pub fn unique(&self) -> Option<Instant> {
        match self {
            Self::Unique(instant) => Some(*instant),
            _ => None,
        }
    }

    /// Picks a single instant according to `disambiguation`.
    pub fn disambiguate(&self, disambiguation: Disambiguation) -> OracleResult<Instant> {
        match *self {
            Self::Unique(instant) => Ok(instant),
            Self::Gap { earlier, later } => disambiguation.pick_gap(earlier, later),
            Self::Overlap { earlier, later } => disambiguation.pick_overlap(earlier, later),
        }
    }
}

impl fmt::Display for ConversionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unique(instant) => write!(f, "{instant}"),
            Self::Gap { earlier, later } => write!(f, "gap between {earlier} and {later}"),
            Self::Overlap { earlier, later } => write!(f, "overlap of {earlier} and {later}"),
        }
    }
}

/// A `TimeZone` is a [`Zone`] resolved from a [`RuleTable`].
#[derive(Debug, Clone, Copy)]
pub struct TimeZone<'t> {
    zone: &'t Zone,
}

impl<'t> TimeZone<'t> {
    /// Resolves `identifier`, following aliases.
    pub fn try_from_table(table: &'t RuleTable, identifier: &str) -> OracleResult<Self> {
        Ok(Self::from_zone(table.zone(identifier)?))
    }

    pub const fn from_zone(zone: &'t Zone) -> Self {
        Self { zone }
    }

    /// The canonical identifier of this zone.
    pub fn identifier(&self) -> &'t str {
        self.zone.identifier()
    }

    pub fn zone(&self) -> &'t Zone {
        self.zone
    }

    /// Returns the regime in effect at `instant`.
    pub fn regime_at(&self, instant: Instant) -> &'t OffsetRegime {
        self.zone.regime_at(instant)
    }

    /// Returns the total offset, including daylight saving time, at `instant`.
    pub fn offset_at(&self, instant: Instant) -> UtcOffsetMinutes {
        self.regime_at(instant).total_offset()
    }

    /// Returns the standard offset at `instant`.
    pub fn base_offset_at(&self, instant: Instant) -> UtcOffsetMinutes {
        self.regime_at(instant).standard_offset
    }

    pub fn abbreviation_at(&self, instant: Instant) -> &'t str {
        self.regime_at(instant).abbreviation()
    }

    /// Converts `instant` to the wall clock reading of this zone.
    pub fn to_local(&self, instant: Instant) -> OracleResult<LocalDateTime> {
        if !instant.is_valid() {
            return Err(OracleError::range().with_message("Instant is outside the valid range."));
        }
        Ok(self.local_from_instant(instant))
    }

    pub(crate) fn local_from_instant(&self, instant: Instant) -> LocalDateTime {
        LocalDateTime::from_instant_with_offset(instant, self.offset_at(instant))
    }

    /// Resolves the wall clock reading `local` to UTC.
    ///
    /// Every regime that may be in effect within the zone's widest offset of
    /// `local` contributes one candidate, which is kept only if it converts
    /// back to `local` exactly.
    pub fn to_utc(&self, local: &LocalDateTime) -> OracleResult<ConversionResult> {
        let wall = local.to_wall_milliseconds();
        let span = self.zone.max_offset_milliseconds();
        let near = self.zone.regimes_near(
            Instant::from_epoch_milliseconds(wall.saturating_sub(span)),
            Instant::from_epoch_milliseconds(wall.saturating_add(span)),
        );

        let mut candidates: Vec<Instant> = Vec::with_capacity(near.len());
        for regime in &self.zone.regimes()[near.clone()] {
            let candidate =
                Instant::from_epoch_milliseconds(wall - regime.total_offset().as_milliseconds());
            if !candidates.contains(&candidate) && self.local_from_instant(candidate) == *local {
                candidates.push(candidate);
            }
        }
        candidates.sort_unstable();

        let result = match candidates.as_slice() {
            [] => self.locate_gap(wall, near)?,
            [unique] => ConversionResult::Unique(*unique),
            [earlier, .., later] => {
                #[cfg(feature = "log")]
                log::trace!(
                    "{local} is ambiguous in {}: {earlier} or {later}",
                    self.identifier()
                );
                ConversionResult::Overlap {
                    earlier: *earlier,
                    later: *later,
                }
            }
        };

        let in_range = match result {
            ConversionResult::Unique(instant) => instant.is_valid(),
            ConversionResult::Gap { earlier, later }
            | ConversionResult::Overlap { earlier, later } => {
                earlier.is_valid() && later.is_valid()
            }
        };
        if !in_range {
            return Err(OracleError::range()
                .with_message("Wall clock time is outside the representable range."));
        }
        Ok(result)
    }

    /// Finds the forward transition that skipped the wall clock time `wall`.
    fn locate_gap(&self, wall: i64, near: Range<usize>) -> OracleResult<ConversionResult> {
        let regimes = self.zone.regimes();
        for index in near.start.max(1)..near.end {
            let transition = regimes[index].effective_from.as_epoch_milliseconds();
            let before = regimes[index - 1].total_offset().as_milliseconds();
            let after = regimes[index].total_offset().as_milliseconds();
            if (transition + before..transition + after).contains(&wall) {
                let gap = ConversionResult::Gap {
                    earlier: Instant::from_epoch_milliseconds(wall - after),
                    later: Instant::from_epoch_milliseconds(wall - before),
                };
                #[cfg(feature = "log")]
                log::trace!("wall time {wall} skipped in {}: {gap}", self.identifier());
                return Ok(gap);
            }
        }
        Err(OracleError::assert().with_message("No transition skips the wall clock time."))
    }

    /// Checks that `local` and `utc` describe the same moment in this zone.
    pub fn verify(&self, local: &LocalDateTime, utc: Instant) -> OracleResult<Verdict> {
        oracle::verify_in_zone(self, local, utc)
    }
}

/// Converts `instant` to the wall clock reading of the zone `identifier`.
pub fn to_local(
    table: &RuleTable,
    identifier: &str,
    instant: Instant,
) -> OracleResult<LocalDateTime> {
    TimeZone::try_from_table(table, identifier)?.to_local(instant)
}

/// Resolves the wall clock reading `local` of the zone `identifier` to UTC.
pub fn to_utc(
    table: &RuleTable,
    identifier: &str,
    local: &LocalDateTime,
) -> OracleResult<ConversionResult> {
    TimeZone::try_from_table(table, identifier)?.to_utc(local)
}
