//! JSON test vector files.
//!
//! ```json
//! {
//!   "zone": "Asia/Aden",
//!   "vectors": [
//!     {
//!       "local": { "year": 1949, "month": 12, "day": 31, "weekday": "Saturday", "hour": 20 },
//!       "utc": { "year": 1949, "month": 12, "day": 31, "hour": 17 },
//!       "offset": { "hours": 3 },
//!       "annotations": { "source": "tzdata 2024a" }
//!     }
//!   ]
//! }
//! ```

use alloc::{
    collections::BTreeMap,
    format,
    string::{String, ToString},
    vec::Vec,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use zonedata_rs::UtcOffsetMinutes;

use crate::{
    iso::{IsoDate, IsoTime, LocalDateTime, Weekday},
    runner::{TestVector, ZoneCases},
    OracleError, OracleResult,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorFile {
    pub zone: String,
    pub vectors: Vec<VectorRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorRecord {
    pub local: FieldsRecord,
    pub utc: FieldsRecord,
    pub offset: OffsetRecord,
    /// Preserved verbatim, never interpreted.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, Value>,
}

/// Date and time fields; `weekday` is advisory and checked against the date.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FieldsRecord {
    pub year: i32,
    pub month: u8,
    pub day: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekday: Option<Weekday>,
    pub hour: u8,
    #[serde(default)]
    pub minute: u8,
    #[serde(default)]
    pub second: u8,
    #[serde(default)]
    pub millisecond: u16,
}

/// A UTC offset; `minutes` takes the sign of `hours`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OffsetRecord {
    pub hours: i32,
    #[serde(default)]
    pub minutes: i32,
}

impl FieldsRecord {
    fn to_local(self) -> OracleResult<LocalDateTime> {
        let local = LocalDateTime::new(
            IsoDate::try_new(self.year, self.month, self.day)?,
            IsoTime::try_new(self.hour, self.minute, self.second, self.millisecond)?,
        );
        match self.weekday {
            Some(weekday) => local.with_weekday(weekday),
            None => Ok(local),
        }
    }
}

impl From<&LocalDateTime> for FieldsRecord {
    fn from(value: &LocalDateTime) -> Self {
        Self {
            year: value.year(),
            month: value.month(),
            day: value.day(),
            weekday: Some(value.weekday()),
            hour: value.hour(),
            minute: value.minute(),
            second: value.second(),
            millisecond: value.millisecond(),
        }
    }
}

impl OffsetRecord {
    fn to_offset(self) -> OracleResult<UtcOffsetMinutes> {
        let minutes = if self.hours < 0 {
            -i64::from(self.minutes).abs()
        } else {
            i64::from(self.minutes)
        };
        let total = i64::from(self.hours) * 60 + minutes;
        if total.abs() >= 24 * 60 {
            return Err(
                OracleError::range().with_message("Offset must be within 24 hours of UTC.")
            );
        }
        Ok(UtcOffsetMinutes(total as i32))
    }
}

impl From<UtcOffsetMinutes> for OffsetRecord {
    fn from(value: UtcOffsetMinutes) -> Self {
        // Whole negative hours keep their sign on `hours`, e.g. -09:30.
        let hours = value.0 / 60;
        let minutes = value.0 % 60;
        Self {
            hours,
            minutes: if hours == 0 { minutes } else { minutes.abs() },
        }
    }
}

impl VectorRecord {
    pub fn to_vector(&self) -> OracleResult<TestVector> {
        let annotations = self
            .annotations
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.clone(), value)
            })
            .collect();
        Ok(TestVector {
            local: self.local.to_local()?,
            utc: self.utc.to_local()?,
            expected_offset: self.offset.to_offset()?,
            annotations,
        })
    }
}

impl From<&TestVector> for VectorRecord {
    fn from(value: &TestVector) -> Self {
        Self {
            local: FieldsRecord::from(&value.local),
            utc: FieldsRecord::from(&value.utc),
            offset: OffsetRecord::from(value.expected_offset),
            annotations: value
                .annotations
                .iter()
                .map(|(key, value)| (key.clone(), Value::String(value.clone())))
                .collect(),
        }
    }
}

impl VectorFile {
    pub fn to_cases(&self) -> OracleResult<ZoneCases> {
        let vectors = self
            .vectors
            .iter()
            .enumerate()
            .map(|(index, record)| {
                record.to_vector().map_err(|err| {
                    OracleError::parse().with_message(format!(
                        "{} vector {index}: {}",
                        self.zone,
                        err.into_message()
                    ))
                })
            })
            .collect::<OracleResult<Vec<_>>>()?;
        Ok(ZoneCases {
            zone: self.zone.clone(),
            vectors,
        })
    }
}

impl From<&ZoneCases> for VectorFile {
    fn from(value: &ZoneCases) -> Self {
        Self {
            zone: value.zone.clone(),
            vectors: value.vectors.iter().map(VectorRecord::from).collect(),
        }
    }
}

impl ZoneCases {
    /// Loads a batch from a JSON vector file.
    pub fn from_json_str(src: &str) -> OracleResult<Self> {
        serde_json::from_str::<VectorFile>(src)
            .map_err(|err| OracleError::parse().with_message(format!("{err}")))?
            .to_cases()
    }

    pub fn to_json_string(&self) -> OracleResult<String> {
        serde_json::to_string_pretty(&VectorFile::from(self))
            .map_err(|err| OracleError::general(format!("{err}")))
    }

    #[cfg(feature = "std")]
    pub fn from_filepath<P: AsRef<std::path::Path>>(path: P) -> OracleResult<Self> {
        let path = path.as_ref();
        let src = std::fs::read_to_string(path)
            .map_err(|err| OracleError::general(format!("{}: {err}", path.display())))?;
        Self::from_json_str(&src)
    }
}
