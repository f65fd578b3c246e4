//! Configuration for the pipeline stages.
//!
//! Values normally come from the environment the stage is hosted in
//! (`QUEUE_URL`, `BUCKET`, `ROLE_ARN`, ...). The binary maps them onto these
//! structs; the library crates only ever see the structs.

use crate::error::ConfigError;

/// Granule search endpoint of the public CMR deployment.
pub const DEFAULT_CMR_SEARCH_URL: &str = "https://cmr.earthdata.nasa.gov/search/granules.json";

/// Largest page the catalog will return.
pub const DEFAULT_PAGE_SIZE: u32 = 2000;

/// Bucket whose HTTPS gateway links are rewritten to direct `s3://` links.
pub const DEFAULT_PROTECTED_BUCKET: &str = "lp-prod-protected";

/// Content type of written batch files.
pub const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";

/// Configuration for the catalog search client.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogConfig {
  /// Granule search endpoint returning the JSON feed format.
  pub search_url: String,
  /// Granules requested per page.
  pub page_size: u32,
}

impl Default for CatalogConfig {
  fn default() -> Self {
    Self {
      search_url: DEFAULT_CMR_SEARCH_URL.to_string(),
      page_size: DEFAULT_PAGE_SIZE,
    }
  }
}

impl CatalogConfig {
  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.search_url.trim().is_empty() {
      return Err(ConfigError::missing("search_url"));
    }
    if self.page_size == 0 {
      return Err(ConfigError::missing("page_size"));
    }
    Ok(())
  }
}

/// Configuration for one NDJSON builder invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct BuilderConfig {
  /// Destination bucket for batch files.
  pub bucket: String,
  /// Queue the batch file URI is published to.
  pub queue_url: String,
  /// Role assumed before reading `s3://` items from another account.
  pub role_arn: Option<String>,
  /// Bucket name whose gateway hrefs get rewritten.
  pub protected_bucket: String,
}

impl BuilderConfig {
  pub fn new(bucket: impl Into<String>, queue_url: impl Into<String>) -> Self {
    Self {
      bucket: bucket.into(),
      queue_url: queue_url.into(),
      role_arn: None,
      protected_bucket: DEFAULT_PROTECTED_BUCKET.to_string(),
    }
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.bucket.trim().is_empty() {
      return Err(ConfigError::missing("bucket"));
    }
    if self.queue_url.trim().is_empty() {
      return Err(ConfigError::missing("queue_url"));
    }
    if self.protected_bucket.trim().is_empty() {
      return Err(ConfigError::missing("protected_bucket"));
    }
    Ok(())
  }
}

/// Overrides applied on top of the ambient AWS configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AwsConfig {
  /// Region override; the SDK default chain is used when unset.
  pub region: Option<String>,
  /// Endpoint override (e.g. LocalStack) for S3, SQS and STS.
  pub endpoint_url: Option<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_catalog_defaults() {
    let config = CatalogConfig::default();
    assert_eq!(config.search_url, DEFAULT_CMR_SEARCH_URL);
    assert_eq!(config.page_size, 2000);
    assert!(config.validate().is_ok());
  }

  #[test]
  fn test_zero_page_size_is_rejected() {
    let config = CatalogConfig {
      page_size: 0,
      ..Default::default()
    };
    assert!(config.validate().is_err());
  }

  #[test]
  fn test_builder_config_requires_bucket() {
    let config = BuilderConfig::new("", "https://sqs.example/queue");
    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::MissingField { ref field } if field == "bucket"));
  }

  #[test]
  fn test_builder_config_defaults_protected_bucket() {
    let config = BuilderConfig::new("ndjson", "https://sqs.example/queue");
    assert_eq!(config.protected_bucket, DEFAULT_PROTECTED_BUCKET);
    assert!(config.role_arn.is_none());
    assert!(config.validate().is_ok());
  }
}
