//! JSON regime records.

use alloc::{collections::BTreeMap, format, string::String, vec::Vec};
use serde::{Deserialize, Serialize};

use crate::{
    table::TableLoad, Instant, OffsetRegime, RuleTable, UtcOffsetMinutes, Zone, ZoneDataError,
};

/// The top level JSON document of regime records.
///
/// ```json
/// {
///   "zones": [
///     {
///       "identifier": "Asia/Aden",
///       "regimes": [
///         {
///           "effective_from": null,
///           "standard_offset": 180,
///           "dst_offset": null,
///           "abbreviation": "LMT"
///         },
///         {
///           "effective_from": -631173600000,
///           "standard_offset": 180,
///           "dst_offset": null,
///           "abbreviation": "+03"
///         }
///       ]
///     }
///   ],
///   "links": { "Asia/Yemen": "Asia/Aden" }
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ZoneRecords {
    pub zones: Vec<ZoneRegimes>,
    #[serde(default)]
    pub links: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneRegimes {
    pub identifier: String,
    pub regimes: Vec<RegimeRecord>,
}

/// A single offset regime; `effective_from` is `null` for the first regime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegimeRecord {
    pub effective_from: Option<i64>,
    pub standard_offset: i32,
    #[serde(default)]
    pub dst_offset: Option<i32>,
    pub abbreviation: String,
}

impl RegimeRecord {
    fn to_regime(&self) -> Result<OffsetRegime, ZoneDataError> {
        OffsetRegime::try_new(
            self.effective_from
                .map(Instant::from_epoch_milliseconds)
                .unwrap_or(Instant::MIN),
            UtcOffsetMinutes(self.standard_offset),
            self.dst_offset.map(UtcOffsetMinutes),
            &self.abbreviation,
        )
    }
}

impl ZoneRegimes {
    pub fn to_zone(&self) -> Result<Zone, ZoneDataError> {
        let regimes = self
            .regimes
            .iter()
            .map(RegimeRecord::to_regime)
            .collect::<Result<Vec<_>, _>>()?;
        Zone::try_new(self.identifier.as_str(), regimes)
    }
}

impl From<&Zone> for ZoneRegimes {
    fn from(zone: &Zone) -> Self {
        let regimes = zone
            .regimes()
            .iter()
            .map(|regime| RegimeRecord {
                effective_from: (regime.effective_from != Instant::MIN)
                    .then(|| regime.effective_from.as_epoch_milliseconds()),
                standard_offset: regime.standard_offset.0,
                dst_offset: regime.dst_offset.map(|dst| dst.0),
                abbreviation: regime.abbreviation().into(),
            })
            .collect();
        Self {
            identifier: zone.identifier().into(),
            regimes,
        }
    }
}

impl From<&RuleTable> for ZoneRecords {
    fn from(table: &RuleTable) -> Self {
        Self {
            zones: table.zones().map(ZoneRegimes::from).collect(),
            links: table
                .links()
                .map(|(alias, target)| (alias.into(), target.into()))
                .collect(),
        }
    }
}

impl RuleTable {
    /// Loads JSON regime records, with the same per-zone rejection policy as
    /// [`RuleTable::from_zoneinfo_str`].
    pub fn from_json_str(src: &str) -> Result<TableLoad, ZoneDataError> {
        let records: ZoneRecords =
            serde_json::from_str(src).map_err(|e| ZoneDataError::Json(format!("{e}")))?;
        let mut load = TableLoad {
            table: RuleTable::default(),
            rejected: Vec::default(),
        };
        for record in &records.zones {
            load.push(&record.identifier, record.to_zone());
        }
        for (alias, target) in &records.links {
            if let Err(err) = load.table.insert_link(alias, target) {
                load.rejected.push((alias.clone(), err));
            }
        }
        Ok(load)
    }

    /// Serializes the table as JSON regime records.
    pub fn to_json_string(&self) -> Result<String, ZoneDataError> {
        serde_json::to_string_pretty(&ZoneRecords::from(self))
            .map_err(|e| ZoneDataError::Json(format!("{e}")))
    }
}
