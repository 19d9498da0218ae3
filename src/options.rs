//! Options for resolving ambiguous wall clock readings.

use core::{fmt, str::FromStr};

use crate::{OracleError, OracleResult};

/// Selects an instant when a wall clock reading falls in a gap or an overlap.
///
/// `Compatible` picks the later candidate of a gap and the earlier candidate
/// of an overlap, which is what most operating system libraries do.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Disambiguation {
    #[default]
    Compatible,
    Earlier,
    Later,
    /// Any non unique reading is a range error.
    Reject,
}

impl Disambiguation {
    const fn name(self) -> &'static str {
        match self {
            Self::Compatible => "compatible",
            Self::Earlier => "earlier",
            Self::Later => "later",
            Self::Reject => "reject",
        }
    }

    /// Chooses between the `earlier` and `later` candidates of a gap.
    pub(crate) fn pick_gap<T>(self, earlier: T, later: T) -> OracleResult<T> {
        match self {
            Self::Earlier => Ok(earlier),
            Self::Compatible | Self::Later => Ok(later),
            Self::Reject => {
                Err(OracleError::range().with_message("Wall clock time falls in a gap."))
            }
        }
    }

    /// Chooses between the `earlier` and `later` candidates of an overlap.
    pub(crate) fn pick_overlap<T>(self, earlier: T, later: T) -> OracleResult<T> {
        match self {
            Self::Compatible | Self::Earlier => Ok(earlier),
            Self::Later => Ok(later),
            Self::Reject => Err(OracleError::range().with_message("Wall clock time is ambiguous.")),
        }
    }
}

impl FromStr for Disambiguation {
    type Err = OracleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Self::Compatible, Self::Earlier, Self::Later, Self::Reject]
            .into_iter()
            .find(|option| option.name() == s)
            .ok_or_else(|| OracleError::parse().with_message("Invalid disambiguation option."))
    }
}

impl fmt::Display for Disambiguation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::Disambiguation;
    use crate::error::ErrorKind;

    #[test]
    fn names() {
        for option in ["compatible", "earlier", "later", "reject"] {
            assert_eq!(option.parse::<Disambiguation>().unwrap().to_string(), option);
        }
        let err = "Later".parse::<Disambiguation>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn picks() {
        assert_eq!(Disambiguation::Compatible.pick_gap(1, 2), Ok(2));
        assert_eq!(Disambiguation::Compatible.pick_overlap(1, 2), Ok(1));
        assert_eq!(Disambiguation::Earlier.pick_gap(1, 2), Ok(1));
        assert_eq!(Disambiguation::Later.pick_overlap(1, 2), Ok(2));
        assert!(Disambiguation::Reject.pick_overlap(1, 2).is_err());
    }
}
