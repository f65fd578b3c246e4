use stac_ingest_config::ConfigError;
use thiserror::Error;

/// Errors that fail a catalog query invocation.
#[derive(Debug, Error)]
pub enum CatalogError {
  /// The query or client configuration did not pass validation.
  #[error(transparent)]
  Invalid(#[from] ConfigError),

  /// The catalog could not be reached.
  #[error("catalog request failed: {0}")]
  Http(#[from] reqwest::Error),

  /// The catalog answered with an error status.
  #[error("catalog returned {status}: {body}")]
  Status { status: u16, body: String },

  /// The catalog response was not the expected feed.
  #[error("invalid catalog response: {message}")]
  Decode { message: String },

  /// An item url could not be published.
  #[error("failed to publish item url: {0}")]
  Publish(#[from] stac_ingest_queue::Error),
}
