//! Error types for item fetching and batch building.

use stac_ingest_href::HrefError;
use thiserror::Error;

/// Why one item could not be turned into an NDJSON line.
#[derive(Debug, Error)]
pub enum FetchError {
  /// The url could not be classified or its collection derived.
  #[error(transparent)]
  Href(#[from] HrefError),

  /// The HTTP request failed before a response arrived.
  #[error("request failed: {0}")]
  Http(#[from] reqwest::Error),

  /// The server answered with an error status.
  #[error("server returned {status}")]
  Status { status: u16 },

  /// Object storage refused or failed the read.
  #[error("object read failed: {message}")]
  Object { message: String },

  /// The body was not a JSON object.
  #[error("invalid item document: {message}")]
  Parse { message: String },

  /// The document parsed but is not a usable STAC item.
  #[error("invalid item: {message}")]
  Item { message: String },
}

impl FetchError {
  pub fn object(message: impl Into<String>) -> Self {
    Self::Object {
      message: message.into(),
    }
  }

  pub fn item(message: impl Into<String>) -> Self {
    Self::Item {
      message: message.into(),
    }
  }
}

/// Errors that fail a whole batch.
#[derive(Debug, Error)]
pub enum BuildError {
  /// The batch carried no urls.
  #[error("batch contains no item urls")]
  EmptyBatch,

  /// One item failed; the batch is abandoned.
  #[error("failed to fetch item '{url}': {source}")]
  Fetch {
    url: String,
    #[source]
    source: FetchError,
  },

  /// Temporary credentials could not be obtained.
  #[error("failed to assume role '{role_arn}': {message}")]
  Credentials { role_arn: String, message: String },

  /// A fetch or writer task ended abnormally.
  #[error("batch task failed: {message}")]
  Task { message: String },

  /// The batch file could not be written.
  #[error("failed to write batch file: {0}")]
  Store(#[from] stac_ingest_blob::Error),

  /// The batch uri could not be published.
  #[error("failed to publish batch uri: {0}")]
  Publish(#[from] stac_ingest_queue::Error),

  /// The invocation was cancelled before the batch was published.
  #[error("batch build cancelled")]
  Cancelled,
}

impl BuildError {
  pub fn fetch(url: impl Into<String>, source: impl Into<FetchError>) -> Self {
    Self::Fetch {
      url: url.into(),
      source: source.into(),
    }
  }

  pub fn task(message: impl Into<String>) -> Self {
    Self::Task {
      message: message.into(),
    }
  }
}
