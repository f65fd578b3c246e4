use std::fmt;

use url::Url;

use crate::collection::{derive_collection, object_collection};
use crate::error::HrefError;

/// Where one STAC item document lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemLocation {
  /// Fetched with an HTTP GET.
  Http(Url),

  /// Read from object storage.
  S3 { url: Url, bucket: String, key: String },
}

impl ItemLocation {
  /// Classify an item URL.
  ///
  /// Only `http`, `https` and `s3` are accepted; anything else is an error
  /// rather than a guess.
  pub fn parse(raw: &str) -> Result<Self, HrefError> {
    let raw = raw.trim();
    let url = Url::parse(raw).map_err(|source| HrefError::Parse {
      url: raw.to_string(),
      source,
    })?;

    match url.scheme() {
      "http" | "https" => Ok(Self::Http(url)),
      "s3" => {
        let (bucket, key) = raw_bucket_and_key(raw).ok_or_else(|| HrefError::Object {
          url: raw.to_string(),
          message: "expected s3://<bucket>/<key>".to_string(),
        })?;
        if bucket.is_empty() {
          return Err(HrefError::Object {
            url: raw.to_string(),
            message: "missing bucket".to_string(),
          });
        }
        if key.is_empty() {
          return Err(HrefError::Object {
            url: raw.to_string(),
            message: "missing key".to_string(),
          });
        }
        Ok(Self::S3 {
          bucket: bucket.to_string(),
          key: key.to_string(),
          url,
        })
      }
      scheme => Err(HrefError::UnsupportedScheme {
        url: raw.to_string(),
        scheme: scheme.to_string(),
      }),
    }
  }

  pub fn url(&self) -> &Url {
    match self {
      Self::Http(url) => url,
      Self::S3 { url, .. } => url,
    }
  }

  /// Collection id implied by this location's layout.
  pub fn collection(&self) -> Result<String, HrefError> {
    match self {
      Self::Http(url) => derive_collection(url),
      Self::S3 { url, key, .. } => object_collection(url.as_str(), key),
    }
  }
}

/// Bucket and key exactly as written after `s3://`.
///
/// The parsed url percent-encodes and dot-normalizes its path, which would
/// name a different object, so the key is cut from the raw string. Query and
/// fragment are dropped.
fn raw_bucket_and_key(raw: &str) -> Option<(&str, &str)> {
  let (_, rest) = raw.split_once("://")?;
  let rest = rest.split(['?', '#']).next().unwrap_or_default();
  match rest.split_once('/') {
    Some((bucket, key)) => Some((bucket, key)),
    None => Some((rest, "")),
  }
}

impl fmt::Display for ItemLocation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.url())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_https() {
    let location = ItemLocation::parse("https://lpdaac/some_granule_stac.json").unwrap();
    assert!(matches!(location, ItemLocation::Http(_)));
  }

  #[test]
  fn test_parse_s3_splits_bucket_and_key() {
    let location = ItemLocation::parse("s3://test/S30/item.json").unwrap();
    match location {
      ItemLocation::S3 { bucket, key, .. } => {
        assert_eq!(bucket, "test");
        assert_eq!(key, "S30/item.json");
      }
      other => panic!("expected s3 location, got {:?}", other),
    }
  }

  #[test]
  fn test_parse_s3_keeps_key_verbatim() {
    let location = ItemLocation::parse("s3://bucket/S30/a b.json").unwrap();
    assert!(matches!(location, ItemLocation::S3 { ref key, .. } if key == "S30/a b.json"));

    let location = ItemLocation::parse("s3://bucket/S30/../L30/x.json").unwrap();
    assert!(matches!(location, ItemLocation::S3 { ref key, .. } if key == "S30/../L30/x.json"));
    assert_eq!(location.collection().unwrap(), "HLSS30");

    let location = ItemLocation::parse("s3://bucket/S30/a%20b.json").unwrap();
    assert!(matches!(location, ItemLocation::S3 { ref key, .. } if key == "S30/a%20b.json"));
  }

  #[test]
  fn test_parse_s3_without_key() {
    let err = ItemLocation::parse("s3://bucket").unwrap_err();
    assert!(matches!(err, HrefError::Object { .. }));
  }

  #[test]
  fn test_parse_rejects_other_schemes() {
    let err = ItemLocation::parse("ftp://host/S30/item.json").unwrap_err();
    assert!(matches!(err, HrefError::UnsupportedScheme { ref scheme, .. } if scheme == "ftp"));

    let err = ItemLocation::parse("gs://bucket/S30/item.json").unwrap_err();
    assert!(matches!(err, HrefError::UnsupportedScheme { .. }));
  }

  #[test]
  fn test_parse_rejects_garbage() {
    let err = ItemLocation::parse("not a url").unwrap_err();
    assert!(matches!(err, HrefError::Parse { .. }));
  }
}
