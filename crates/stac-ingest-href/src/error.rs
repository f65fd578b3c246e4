use thiserror::Error;

/// Errors raised while interpreting an item URL.
#[derive(Debug, Error)]
pub enum HrefError {
  /// The URL could not be parsed at all.
  #[error("invalid url '{url}': {source}")]
  Parse {
    url: String,
    #[source]
    source: url::ParseError,
  },

  /// The URL uses a scheme items are never fetched from.
  #[error("unsupported scheme '{scheme}' in '{url}'")]
  UnsupportedScheme { url: String, scheme: String },

  /// The URL path lacks the segment the collection id is taken from.
  #[error("cannot derive collection from '{url}': {message}")]
  Collection { url: String, message: String },

  /// An `s3://` URL without a bucket or key.
  #[error("invalid object url '{url}': {message}")]
  Object { url: String, message: String },
}
