//! Granule query input for the catalog query stage.
//!
//! # Examples
//!
//! ```json
//! {
//!   "short_name": "HLSS30",
//!   "version": "2.0",
//!   "start_date": "2021-07-28 05:00:00",
//!   "end_date": "2021-07-29T05:00:00Z",
//!   "bbox": [-123.75, 35.029996, -110.390625, 44.21371]
//! }
//! ```
//!
//! Timestamps without an offset are taken as UTC.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ConfigError;

/// Naive layouts accepted in addition to RFC 3339.
const NAIVE_FORMATS: &[&str] = &[
  "%Y-%m-%d %H:%M:%S",
  "%Y-%m-%dT%H:%M:%S",
  "%Y-%m-%d %H:%M:%S%.f",
  "%Y-%m-%dT%H:%M:%S%.f",
];

/// A catalog search for one collection version over a time range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GranuleQuery {
  /// Collection short name, e.g. "HLSS30"
  pub short_name: String,

  /// Collection version, e.g. "2.0"
  pub version: String,

  #[serde(with = "timestamp")]
  pub start_date: DateTime<Utc>,

  #[serde(with = "timestamp")]
  pub end_date: DateTime<Utc>,

  /// Optional spatial filter. When absent no spatial filter is sent at all.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub bbox: Option<BoundingBox>,
}

impl GranuleQuery {
  /// Parse and validate a query from its JSON form.
  pub fn from_json(input: &str) -> Result<Self, ConfigError> {
    let query: GranuleQuery = serde_json::from_str(input)?;
    query.validate()?;
    Ok(query)
  }

  /// The query used when the caller supplies none: one day of HLS Sentinel-2
  /// granules over the western United States.
  pub fn defaults() -> Self {
    Self {
      short_name: "HLSS30".to_string(),
      version: "2.0".to_string(),
      // 2021-07-28T05:00:00Z .. 2021-07-29T05:00:00Z
      start_date: DateTime::from_timestamp(1_627_448_400, 0).unwrap_or_default(),
      end_date: DateTime::from_timestamp(1_627_534_800, 0).unwrap_or_default(),
      bbox: Some(BoundingBox {
        min_lon: -123.75,
        min_lat: 35.029996,
        max_lon: -110.390625,
        max_lat: 44.21371,
      }),
    }
  }

  /// Check the fields serde cannot check on its own.
  ///
  /// An inverted time range is accepted; the catalog answers it with no
  /// granules.
  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.short_name.trim().is_empty() {
      return Err(ConfigError::missing("short_name"));
    }
    if self.version.trim().is_empty() {
      return Err(ConfigError::missing("version"));
    }
    if let Some(bbox) = &self.bbox {
      bbox.validate()?;
    }
    Ok(())
  }
}

/// Field-level overrides applied on top of a base query.
#[derive(Debug, Clone, Default)]
pub struct QueryOverrides {
  pub short_name: Option<String>,
  pub version: Option<String>,
  pub start_date: Option<DateTime<Utc>>,
  pub end_date: Option<DateTime<Utc>>,
  pub bbox: Option<BoundingBox>,
}

impl QueryOverrides {
  /// Return `query` with every set override replacing its field.
  pub fn apply(self, mut query: GranuleQuery) -> GranuleQuery {
    if let Some(short_name) = self.short_name {
      query.short_name = short_name;
    }
    if let Some(version) = self.version {
      query.version = version;
    }
    if let Some(start_date) = self.start_date {
      query.start_date = start_date;
    }
    if let Some(end_date) = self.end_date {
      query.end_date = end_date;
    }
    if let Some(bbox) = self.bbox {
      query.bbox = Some(bbox);
    }
    query
  }
}

/// A spatial filter in (min-lon, min-lat, max-lon, max-lat) order.
///
/// Serialized as a four element array. `min_lon > max_lon` is allowed so boxes
/// can cross the antimeridian.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "[f64; 4]")]
pub struct BoundingBox {
  pub min_lon: f64,
  pub min_lat: f64,
  pub max_lon: f64,
  pub max_lat: f64,
}

impl BoundingBox {
  /// Create a validated bounding box.
  pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Result<Self, ConfigError> {
    let bbox = Self {
      min_lon,
      min_lat,
      max_lon,
      max_lat,
    };
    bbox.validate()?;
    Ok(bbox)
  }

  pub fn to_array(&self) -> [f64; 4] {
    [self.min_lon, self.min_lat, self.max_lon, self.max_lat]
  }

  fn validate(&self) -> Result<(), ConfigError> {
    if self.to_array().iter().any(|v| !v.is_finite()) {
      return Err(ConfigError::bounding_box("coordinates must be finite"));
    }
    for lon in [self.min_lon, self.max_lon] {
      if !(-180.0..=180.0).contains(&lon) {
        return Err(ConfigError::bounding_box(format!(
          "longitude {} outside [-180, 180]",
          lon
        )));
      }
    }
    for lat in [self.min_lat, self.max_lat] {
      if !(-90.0..=90.0).contains(&lat) {
        return Err(ConfigError::bounding_box(format!(
          "latitude {} outside [-90, 90]",
          lat
        )));
      }
    }
    if self.min_lat > self.max_lat {
      return Err(ConfigError::bounding_box(format!(
        "min latitude {} is above max latitude {}",
        self.min_lat, self.max_lat
      )));
    }
    Ok(())
  }
}

impl TryFrom<Vec<f64>> for BoundingBox {
  type Error = ConfigError;

  fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
    match values.as_slice() {
      [min_lon, min_lat, max_lon, max_lat] => Self::new(*min_lon, *min_lat, *max_lon, *max_lat),
      _ => Err(ConfigError::bounding_box(format!(
        "expected 4 values, got {}",
        values.len()
      ))),
    }
  }
}

impl From<BoundingBox> for [f64; 4] {
  fn from(bbox: BoundingBox) -> Self {
    bbox.to_array()
  }
}

impl FromStr for BoundingBox {
  type Err = ConfigError;

  /// Parse `min_lon,min_lat,max_lon,max_lat`.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let values = s
      .split(',')
      .map(|part| {
        part
          .trim()
          .parse::<f64>()
          .map_err(|e| ConfigError::bounding_box(format!("'{}': {}", part.trim(), e)))
      })
      .collect::<Result<Vec<_>, _>>()?;
    Self::try_from(values)
  }
}

/// Parse an RFC 3339 timestamp, or a naive date/time taken as UTC.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, ConfigError> {
  let value = value.trim();

  if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
    return Ok(dt.with_timezone(&Utc));
  }

  for format in NAIVE_FORMATS {
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
      return Ok(naive.and_utc());
    }
  }

  if let Some(naive) = NaiveDate::parse_from_str(value, "%Y-%m-%d")
    .ok()
    .and_then(|date| date.and_hms_opt(0, 0, 0))
  {
    return Ok(naive.and_utc());
  }

  Err(ConfigError::InvalidTimestamp {
    value: value.to_string(),
  })
}

mod timestamp {
  use super::*;

  pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Secs, true))
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
  }
}
