//! The zone arena.

use alloc::{borrow::ToOwned, string::String, vec::Vec};
use hashbrown::{DefaultHashBuilder, HashMap};
use indexmap::IndexMap;

#[cfg(feature = "std")]
use std::path::Path;

use crate::{
    parser::ZoneDataParser, regime::MalformedReason, Instant, OffsetRegime, Zone, ZoneDataError,
};

/// `RuleTable` is an arena of [`Zone`]s in insertion order, with lookup by
/// identifier or `Link` alias.
///
/// A table is immutable once loaded and can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    zones: IndexMap<String, Zone, DefaultHashBuilder>,
    links: HashMap<String, String>,
}

/// The result of loading a [`RuleTable`] from a source that may contain
/// invalid zones.
#[derive(Debug)]
pub struct TableLoad {
    /// All zones that passed validation.
    pub table: RuleTable,
    /// Zones that failed validation, paired with their identifier.
    pub rejected: Vec<(String, ZoneDataError)>,
}

impl TableLoad {
    /// Adds a zone, recording it as rejected on failure.
    pub(crate) fn push(&mut self, identifier: &str, zone: Result<Zone, ZoneDataError>) {
        let result = zone.and_then(|zone| self.table.insert(zone));
        if let Err(err) = result {
            self.rejected.push((identifier.to_owned(), err));
        }
    }
}

impl RuleTable {
    /// Registers `zone`.
    ///
    /// Fails with [`ZoneDataError::MalformedRuleTable`] if the identifier is
    /// already registered as a zone or alias, leaving the table unchanged.
    pub fn insert(&mut self, zone: Zone) -> Result<(), ZoneDataError> {
        if self.contains(zone.identifier()) {
            return Err(ZoneDataError::malformed(
                zone.identifier().to_owned(),
                MalformedReason::DuplicateZone,
            ));
        }
        self.zones.insert(zone.identifier().to_owned(), zone);
        Ok(())
    }

    /// Builds a table from `zones`; on any failure no table is produced.
    pub fn try_from_zones<I>(zones: I) -> Result<Self, ZoneDataError>
    where
        I: IntoIterator<Item = Zone>,
    {
        let mut table = Self::default();
        for zone in zones {
            table.insert(zone)?;
        }
        Ok(table)
    }

    /// Registers `alias` as another name for the zone `target`.
    ///
    /// The target does not need to be registered yet.
    pub fn insert_link(&mut self, alias: &str, target: &str) -> Result<(), ZoneDataError> {
        if self.contains(alias) {
            return Err(ZoneDataError::malformed(
                alias.to_owned(),
                MalformedReason::DuplicateZone,
            ));
        }
        self.links.insert(alias.to_owned(), target.to_owned());
        Ok(())
    }

    /// Parses zoneinfo-style source text.
    ///
    /// Syntax errors are fatal. Zones that parse but fail validation are
    /// returned in [`TableLoad::rejected`] while the remaining zones load.
    pub fn from_zoneinfo_str(src: &str) -> Result<TableLoad, ZoneDataError> {
        let source = ZoneDataParser::from_zoneinfo_str(src).parse()?;
        let mut load = TableLoad {
            table: Self::default(),
            rejected: Vec::default(),
        };
        for (identifier, record) in &source.zones {
            load.push(identifier, record.to_zone(identifier));
        }
        for (alias, target) in &source.links {
            if let Err(err) = load.table.insert_link(alias, target) {
                load.rejected.push((alias.clone(), err));
            }
        }
        Ok(load)
    }

    /// Loads a table from a file path.
    ///
    /// A path with a `.json` extension is read as JSON regime records when the
    /// `serde` feature is enabled, otherwise the file is read as zoneinfo source.
    #[cfg(feature = "std")]
    pub fn from_filepath<P: AsRef<Path>>(path: P) -> Result<TableLoad, ZoneDataError> {
        let path = path.as_ref();
        let src = std::fs::read_to_string(path)?;
        #[cfg(feature = "serde")]
        if path.extension().is_some_and(|ext| ext == "json") {
            return Self::from_json_str(&src);
        }
        Self::from_zoneinfo_str(&src)
    }

    /// Returns the canonical identifier for `identifier`, following aliases.
    ///
    /// Lookup is exact and case-sensitive.
    pub fn resolve<'a>(&'a self, identifier: &'a str) -> Option<&'a str> {
        if let Some((id, _)) = self.zones.get_key_value(identifier) {
            return Some(id.as_str());
        }
        let target = self.links.get(identifier)?;
        self.zones
            .get_key_value(target.as_str())
            .map(|(id, _)| id.as_str())
    }

    /// Returns the zone registered under `identifier` or one of its aliases.
    pub fn zone(&self, identifier: &str) -> Result<&Zone, ZoneDataError> {
        self.resolve(identifier)
            .and_then(|id| self.zones.get(id))
            .ok_or_else(|| ZoneDataError::UnknownZone(identifier.to_owned()))
    }

    /// Returns the regime of `identifier` in effect at `instant`.
    pub fn regime_at(
        &self,
        identifier: &str,
        instant: Instant,
    ) -> Result<&OffsetRegime, ZoneDataError> {
        self.zone(identifier).map(|zone| zone.regime_at(instant))
    }

    /// Iterates over all zones in insertion order.
    pub fn zones(&self) -> impl Iterator<Item = &Zone> {
        self.zones.values()
    }

    /// Iterates over all `(alias, target)` pairs.
    pub fn links(&self) -> impl Iterator<Item = (&str, &str)> {
        self.links.iter().map(|(a, t)| (a.as_str(), t.as_str()))
    }

    /// The number of zones in the table, not counting aliases.
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Returns whether `identifier` names a zone or an alias.
    pub fn contains(&self, identifier: &str) -> bool {
        self.zones.contains_key(identifier) || self.links.contains_key(identifier)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::{UtcOffsetMinutes, ZoneDataParseError};

    fn zone(identifier: &str, effective_from: &[i64]) -> Result<Zone, ZoneDataError> {
        let regimes = effective_from
            .iter()
            .map(|ms| {
                OffsetRegime::try_new(
                    Instant::from_epoch_milliseconds(*ms),
                    UtcOffsetMinutes(60),
                    None,
                    "TST",
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        Zone::try_new(identifier, regimes)
    }

    #[test]
    fn insert_and_lookup() {
        let mut table = RuleTable::default();
        table.insert(zone("Test/One", &[i64::MIN]).unwrap()).unwrap();
        table.insert(zone("Test/Two", &[i64::MIN, 0]).unwrap()).unwrap();
        table.insert_link("Test/Alias", "Test/Two").unwrap();

        assert_eq!(table.len(), 2);
        assert!(table.contains("Test/Alias"));
        assert!(!table.contains("test/one"));
        assert_eq!(table.resolve("Test/Alias"), Some("Test/Two"));
        assert_eq!(table.zone("Test/Alias").unwrap().regimes().len(), 2);
        assert_eq!(
            table.zones().map(Zone::identifier).collect::<Vec<_>>(),
            vec!["Test/One", "Test/Two"]
        );
        assert!(matches!(
            table.regime_at("Test/Missing", Instant::EPOCH),
            Err(ZoneDataError::UnknownZone(id)) if id == "Test/Missing"
        ));
    }

    #[test]
    fn duplicate_zone_leaves_table_unchanged() {
        let mut table = RuleTable::default();
        table.insert(zone("Test/One", &[i64::MIN]).unwrap()).unwrap();
        let err = table
            .insert(zone("Test/One", &[i64::MIN, 0]).unwrap())
            .unwrap_err();
        assert!(matches!(
            err,
            ZoneDataError::MalformedRuleTable {
                reason: MalformedReason::DuplicateZone,
                ..
            }
        ));
        assert_eq!(table.zone("Test/One").unwrap().regimes().len(), 1);
    }

    #[test]
    fn try_from_zones_is_all_or_nothing() {
        let zones = vec![
            zone("Test/One", &[i64::MIN]).unwrap(),
            zone("Test/One", &[i64::MIN]).unwrap(),
        ];
        assert!(RuleTable::try_from_zones(zones).is_err());
        assert!(zone("Test/Bad", &[i64::MIN, 10, 10]).is_err());
    }

    #[test]
    fn per_zone_rejection() {
        let src = r#"
Zone	Test/Good	1:00	-	TST
Zone	Test/Bad	1:00	-	AAA	2000 Jan 1 0:00u
			2:00	-	BBB	2000 Jan 1 0:00u
			3:00	-	CCC
Zone	Test/Long	1:00	-	ABBREVIATION
Link	Test/Good	Test/Link
"#;
        let load = RuleTable::from_zoneinfo_str(src).unwrap();
        assert_eq!(load.table.len(), 1);
        assert_eq!(load.table.resolve("Test/Link"), Some("Test/Good"));
        let rejected = load
            .rejected
            .iter()
            .map(|(id, _)| id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(rejected, vec!["Test/Bad", "Test/Long"]);
    }

    #[test]
    fn syntax_errors_are_fatal() {
        let err = RuleTable::from_zoneinfo_str("Zone Test/Zone 1:00 US T%sT\n").unwrap_err();
        assert!(matches!(err, ZoneDataError::Parse(_)));

        let src = "Zone Test/Far 1:00 - AAA 2147483647\n 2:00 - BBB\n";
        let err = RuleTable::from_zoneinfo_str(src).unwrap_err();
        assert!(matches!(
            err,
            ZoneDataError::Parse(ZoneDataParseError::UnknownValue(1, _))
        ));
    }
}
