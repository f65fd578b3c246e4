use url::Url;

use crate::error::HrefError;

/// Infer the collection id of the item at `url`.
///
/// - `http(s)://host/<seg0>/<seg1>/...` yields `<seg1>` up to its first `.`,
///   e.g. `.../lp-prod-public/HLSS30.020/...` gives `HLSS30`.
/// - `s3://bucket/<seg0>/...` yields `HLS<seg0>`, e.g. `/S30/...` gives
///   `HLSS30`.
///
/// Any other scheme is an error, as is a layout that would produce an empty
/// id.
pub fn derive_collection(url: &Url) -> Result<String, HrefError> {
  let path = url.path();

  let collection = match url.scheme() {
    "http" | "https" => {
      let segment = path
        .split('/')
        .nth(2)
        .ok_or_else(|| collection_error(url, "path has fewer than two segments"))?;
      segment
        .split_once('.')
        .map_or(segment, |(stem, _)| stem)
        .to_string()
    }
    "s3" => return object_collection(url.as_str(), path.strip_prefix('/').unwrap_or(path)),
    scheme => {
      return Err(HrefError::UnsupportedScheme {
        url: url.to_string(),
        scheme: scheme.to_string(),
      });
    }
  };

  if collection.is_empty() {
    return Err(collection_error(url, "collection segment is empty"));
  }
  Ok(collection)
}

/// `HLS` plus the first segment of an object key.
pub(crate) fn object_collection(url: &str, key: &str) -> Result<String, HrefError> {
  match key.split('/').next() {
    Some(segment) if !segment.is_empty() => Ok(format!("HLS{}", segment)),
    _ => Err(HrefError::Collection {
      url: url.to_string(),
      message: "object key has no leading segment".to_string(),
    }),
  }
}

fn collection_error(url: &Url, message: &str) -> HrefError {
  HrefError::Collection {
    url: url.to_string(),
    message: message.to_string(),
  }
}
