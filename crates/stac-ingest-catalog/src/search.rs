use chrono::{DateTime, SecondsFormat, Utc};
use stac_ingest_config::{BoundingBox, GranuleQuery};

/// A granule search request.
///
/// Built up one constraint at a time; only constraints that were set are sent
/// to the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct GranuleSearch {
  short_name: String,
  version: Option<String>,
  temporal: Option<(DateTime<Utc>, DateTime<Utc>)>,
  bounding_box: Option<BoundingBox>,
}

impl GranuleSearch {
  /// Search one collection by short name.
  pub fn new(short_name: impl Into<String>) -> Self {
    Self {
      short_name: short_name.into(),
      version: None,
      temporal: None,
      bounding_box: None,
    }
  }

  /// Build the search for a validated query.
  ///
  /// The spatial filter is only applied when the query carries a bbox.
  pub fn from_query(query: &GranuleQuery) -> Self {
    let search = Self::new(&query.short_name)
      .with_version(&query.version)
      .with_temporal(query.start_date, query.end_date);

    match query.bbox {
      Some(bbox) => search.with_bounding_box(bbox),
      None => search,
    }
  }

  pub fn with_version(mut self, version: impl Into<String>) -> Self {
    self.version = Some(version.into());
    self
  }

  pub fn with_temporal(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
    self.temporal = Some((start, end));
    self
  }

  pub fn with_bounding_box(mut self, bbox: BoundingBox) -> Self {
    self.bounding_box = Some(bbox);
    self
  }

  pub fn short_name(&self) -> &str {
    &self.short_name
  }

  pub fn version(&self) -> Option<&str> {
    self.version.as_deref()
  }

  pub fn temporal(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    self.temporal
  }

  pub fn bounding_box(&self) -> Option<&BoundingBox> {
    self.bounding_box.as_ref()
  }

  /// Query string parameters for the catalog's granule search.
  pub fn params(&self) -> Vec<(&'static str, String)> {
    let mut params = vec![("short_name", self.short_name.clone())];

    if let Some(version) = &self.version {
      params.push(("version", version.clone()));
    }
    if let Some((start, end)) = &self.temporal {
      params.push((
        "temporal",
        format!(
          "{},{}",
          start.to_rfc3339_opts(SecondsFormat::Secs, true),
          end.to_rfc3339_opts(SecondsFormat::Secs, true)
        ),
      ));
    }
    if let Some(bbox) = &self.bounding_box {
      params.push((
        "bounding_box",
        format!(
          "{},{},{},{}",
          bbox.min_lon, bbox.min_lat, bbox.max_lon, bbox.max_lat
        ),
      ));
    }

    params
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn query_without_bbox() -> GranuleQuery {
    GranuleQuery {
      bbox: None,
      ..GranuleQuery::defaults()
    }
  }

  #[test]
  fn test_from_query_sets_every_constraint() {
    let query = GranuleQuery::defaults();
    let search = GranuleSearch::from_query(&query);

    assert_eq!(search.short_name(), "HLSS30");
    assert_eq!(search.version(), Some("2.0"));
    assert_eq!(search.temporal(), Some((query.start_date, query.end_date)));
    assert_eq!(search.bounding_box(), query.bbox.as_ref());
  }

  #[test]
  fn test_params_encoding() {
    let search = GranuleSearch::from_query(&GranuleQuery::defaults());

    assert_eq!(
      search.params(),
      vec![
        ("short_name", "HLSS30".to_string()),
        ("version", "2.0".to_string()),
        (
          "temporal",
          "2021-07-28T05:00:00Z,2021-07-29T05:00:00Z".to_string()
        ),
        (
          "bounding_box",
          "-123.75,35.029996,-110.390625,44.21371".to_string()
        ),
      ]
    );
  }

  #[test]
  fn test_missing_bbox_skips_spatial_filter() {
    let search = GranuleSearch::from_query(&query_without_bbox());

    assert!(search.bounding_box().is_none());
    assert!(
      search
        .params()
        .iter()
        .all(|(name, _)| *name != "bounding_box")
    );
  }
}
