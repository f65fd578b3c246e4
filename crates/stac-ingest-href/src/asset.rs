use serde_json::{Map, Value};
use url::Url;

/// Rewrite an asset's gateway href into a direct object-store href.
///
/// When the first path segment of the asset's `href` equals
/// `protected_bucket`, the `scheme://host/` prefix is replaced by `s3://` and
/// the rest of the href is kept verbatim. Every other asset, including one
/// without a usable `href`, is returned unchanged.
///
/// The input is never modified; a copy is returned.
pub fn rewrite_protected_href(asset: &Value, protected_bucket: &str) -> Value {
  let s3_href = asset
    .get("href")
    .and_then(Value::as_str)
    .and_then(|href| protected_s3_href(href, protected_bucket));

  match s3_href {
    Some(s3_href) => {
      let mut updated = asset.clone();
      updated["href"] = Value::String(s3_href);
      updated
    }
    None => asset.clone(),
  }
}

/// Apply [`rewrite_protected_href`] to every asset of an item.
pub fn rewrite_assets(assets: &Map<String, Value>, protected_bucket: &str) -> Map<String, Value> {
  assets
    .iter()
    .map(|(name, asset)| (name.clone(), rewrite_protected_href(asset, protected_bucket)))
    .collect()
}

fn protected_s3_href(href: &str, protected_bucket: &str) -> Option<String> {
  Url::parse(href).ok()?.host_str()?;

  // Check and rewrite the same raw text; the parsed path is normalized.
  let (_, after_scheme) = href.split_once("://")?;
  let (_, rest) = after_scheme.split_once('/')?;
  if rest.split(['/', '?', '#']).next() != Some(protected_bucket) {
    return None;
  }
  Some(format!("s3://{}", rest))
}
