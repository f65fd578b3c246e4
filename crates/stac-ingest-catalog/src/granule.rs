use serde::{Deserialize, Serialize};

/// Suffix every STAC item link ends with.
const ITEM_SUFFIX: &str = "stac.json";

/// Scheme prefix of links the builder can fetch without credentials.
const ITEM_SCHEME: &str = "https";

/// One granule entry from the catalog's JSON feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Granule {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id: Option<String>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub title: Option<String>,

  #[serde(default)]
  pub links: Vec<Link>,
}

/// A link attached to a granule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
  #[serde(default)]
  pub href: String,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub rel: Option<String>,
}

/// Whether a link points at a STAC item the builder should fetch.
pub fn is_item_href(href: &str) -> bool {
  href.ends_with(ITEM_SUFFIX) && href.starts_with(ITEM_SCHEME)
}

/// Item urls of every granule, in granule then link order.
///
/// Duplicates are kept.
pub fn item_urls(granules: &[Granule]) -> Vec<String> {
  granules
    .iter()
    .flat_map(|granule| granule.links.iter())
    .filter(|link| is_item_href(&link.href))
    .map(|link| link.href.clone())
    .collect()
}
