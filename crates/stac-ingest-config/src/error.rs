use thiserror::Error;

/// Errors raised while parsing or validating stage inputs and configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
  /// A required field is missing or empty.
  #[error("missing required field: {field}")]
  MissingField { field: String },

  /// A timestamp could not be parsed.
  #[error("invalid timestamp '{value}': expected RFC 3339 or 'YYYY-MM-DD HH:MM:SS'")]
  InvalidTimestamp { value: String },

  /// A bounding box was malformed.
  #[error("invalid bounding box: {message}")]
  InvalidBoundingBox { message: String },

  /// A queue batch carried no records.
  #[error("queue event contains no records")]
  EmptyEvent,

  /// The input was not valid JSON for the expected shape.
  #[error("invalid input: {0}")]
  Json(#[from] serde_json::Error),
}

impl ConfigError {
  pub fn missing(field: impl Into<String>) -> Self {
    Self::MissingField {
      field: field.into(),
    }
  }

  pub fn bounding_box(message: impl Into<String>) -> Self {
    Self::InvalidBoundingBox {
      message: message.into(),
    }
  }
}
