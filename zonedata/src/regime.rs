//! Offset regimes and the zones built from them.

use core::{fmt, ops::Range};

use alloc::{string::String, vec::Vec};
use tinystr::TinyAsciiStr;

use crate::{Instant, UtcOffsetMinutes, ZoneDataError};

/// A time zone abbreviation, e.g. `LMT`, `EST` or `+03`.
pub type Abbreviation = TinyAsciiStr<8>;

/// Offsets must stay strictly within a day of UTC.
const MAX_OFFSET_MINUTES: i64 = 24 * 60;

/// An `OffsetRegime` is a maximal interval during which a zone's offset rule is constant.
///
/// The regime is in effect from `effective_from` until the `effective_from` of the
/// next regime in the zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetRegime {
    /// The instant the regime comes into effect.
    ///
    /// [`Instant::MIN`] represents a regime that has been in effect since `-infinity`.
    pub effective_from: Instant,
    /// The standard (base) offset of the regime.
    pub standard_offset: UtcOffsetMinutes,
    /// The daylight saving amount added on top of the standard offset, if any.
    pub dst_offset: Option<UtcOffsetMinutes>,
    /// The designation of the regime.
    pub abbreviation: Abbreviation,
}

impl OffsetRegime {
    /// Creates a new regime.
    ///
    /// The standard and total offsets must be less than 24 hours from UTC,
    /// and `effective_from` must be [`Instant::MIN`] or a valid instant.
    pub fn try_new(
        effective_from: Instant,
        standard_offset: UtcOffsetMinutes,
        dst_offset: Option<UtcOffsetMinutes>,
        abbreviation: &str,
    ) -> Result<Self, ZoneDataError> {
        if effective_from != Instant::MIN && !effective_from.is_valid() {
            return Err(ZoneDataError::InvalidInstant(
                effective_from.as_epoch_milliseconds(),
            ));
        }
        let total = i64::from(standard_offset.0) + dst_offset.map_or(0, |dst| i64::from(dst.0));
        for minutes in [i64::from(standard_offset.0), total] {
            if minutes.abs() >= MAX_OFFSET_MINUTES {
                return Err(ZoneDataError::InvalidOffset(minutes));
            }
        }
        let abbreviation = abbreviation
            .parse::<Abbreviation>()
            .map_err(|_| ZoneDataError::InvalidAbbreviation(abbreviation.into()))?;
        Ok(Self {
            effective_from,
            standard_offset,
            dst_offset,
            abbreviation,
        })
    }

    /// The full offset from UTC while this regime is in effect.
    #[inline]
    pub fn total_offset(&self) -> UtcOffsetMinutes {
        self.standard_offset + self.dst_offset.unwrap_or_default()
    }

    /// Whether this regime observes daylight saving time.
    #[inline]
    pub fn is_dst(&self) -> bool {
        self.dst_offset.is_some_and(|dst| !dst.is_zero())
    }

    #[inline]
    pub fn abbreviation(&self) -> &str {
        self.abbreviation.as_str()
    }
}

impl fmt::Display for OffsetRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} from {} ({}",
            self.abbreviation(),
            self.effective_from,
            self.standard_offset
        )?;
        if let Some(dst) = self.dst_offset {
            write!(f, ", dst {dst}")?;
        }
        f.write_str(")")
    }
}

/// The reason a zone's regime table failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedReason {
    /// The zone has no regimes.
    Empty,
    /// The regime at `index` does not start strictly after its predecessor.
    NonMonotonic { index: usize },
    /// A zone with the same identifier is already registered.
    DuplicateZone,
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("zone has no offset regimes"),
            Self::NonMonotonic { index } => write!(
                f,
                "regime {index} does not start strictly after regime {}",
                index - 1
            ),
            Self::DuplicateZone => f.write_str("zone identifier is already registered"),
        }
    }
}

/// A `Zone` is the ordered offset history of a single time zone identifier.
///
/// ```txt
/// Asia/Aden
///   [-infinity, 1949-12-31T18:00Z)   +03:00  LMT
///   [1949-12-31T18:00Z, +infinity)   +03:00  +03
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    identifier: String,
    regimes: Vec<OffsetRegime>,
    /// The largest absolute total offset found in `regimes`, in milliseconds.
    max_offset_ms: i64,
}

impl Zone {
    /// Creates a new `Zone`, validating that the regimes are non-empty and
    /// that `effective_from` is strictly increasing.
    pub fn try_new<S: Into<String>>(
        identifier: S,
        regimes: Vec<OffsetRegime>,
    ) -> Result<Self, ZoneDataError> {
        let identifier = identifier.into();
        if regimes.is_empty() {
            return Err(ZoneDataError::malformed(identifier, MalformedReason::Empty));
        }
        if let Some(index) = regimes
            .windows(2)
            .position(|pair| pair[0].effective_from >= pair[1].effective_from)
        {
            return Err(ZoneDataError::malformed(
                identifier,
                MalformedReason::NonMonotonic { index: index + 1 },
            ));
        }
        let max_offset_ms = regimes
            .iter()
            .map(|r| r.total_offset().as_milliseconds().abs())
            .max()
            .unwrap_or_default();
        Ok(Self {
            identifier,
            regimes,
            max_offset_ms,
        })
    }

    #[inline]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    #[inline]
    pub fn regimes(&self) -> &[OffsetRegime] {
        &self.regimes
    }

    /// The largest absolute offset this zone ever observes, in milliseconds.
    #[inline]
    pub fn max_offset_milliseconds(&self) -> i64 {
        self.max_offset_ms
    }

    /// Returns the index of the regime in effect at `instant`.
    ///
    /// Instants before the first `effective_from` resolve to the first regime.
    pub fn regime_index_at(&self, instant: Instant) -> usize {
        self.regimes
            .partition_point(|regime| regime.effective_from <= instant)
            .saturating_sub(1)
    }

    /// Returns the regime in effect at `instant`.
    pub fn regime_at(&self, instant: Instant) -> &OffsetRegime {
        &self.regimes[self.regime_index_at(instant)]
    }

    /// Returns the index range of regimes in effect at any point of `[start, end]`.
    pub fn regimes_near(&self, start: Instant, end: Instant) -> Range<usize> {
        self.regime_index_at(start)..self.regime_index_at(end) + 1
    }

    /// Iterates the transitions of this zone as `(previous, next)` regime pairs.
    pub fn transitions(&self) -> impl Iterator<Item = (&OffsetRegime, &OffsetRegime)> {
        self.regimes.windows(2).map(|pair| (&pair[0], &pair[1]))
    }
}
