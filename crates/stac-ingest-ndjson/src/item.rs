use serde_json::{Map, Value};
use stac_ingest_href::rewrite_assets;

use crate::error::FetchError;

/// A STAC item document as a JSON object, keys in fetched order.
pub type Item = Map<String, Value>;

/// Parse a fetched body into an item.
///
/// Anything other than a JSON object is rejected.
pub fn parse_item(body: &[u8]) -> Result<Item, FetchError> {
  let value: Value = serde_json::from_slice(body).map_err(|e| FetchError::Parse {
    message: e.to_string(),
  })?;
  match value {
    Value::Object(item) => Ok(item),
    other => Err(FetchError::Parse {
      message: format!("expected a JSON object, got {}", kind(&other)),
    }),
  }
}

/// Stamp the collection id and rewrite protected asset hrefs.
///
/// Every other field is left as fetched. The item must carry an `assets`
/// object.
pub fn prepare_item(
  mut item: Item,
  collection: &str,
  protected_bucket: &str,
) -> Result<Item, FetchError> {
  let assets = match item.get("assets") {
    Some(Value::Object(assets)) => rewrite_assets(assets, protected_bucket),
    Some(other) => {
      return Err(FetchError::item(format!(
        "assets must be an object, got {}",
        kind(other)
      )));
    }
    None => return Err(FetchError::item("missing assets")),
  };

  item.insert("collection".to_string(), Value::String(collection.to_string()));
  item.insert("assets".to_string(), Value::Object(assets));
  Ok(item)
}

/// One NDJSON line: compact JSON followed by a newline.
pub fn to_line(item: &Item) -> Result<String, FetchError> {
  let mut line = serde_json::to_string(item).map_err(|e| FetchError::Parse {
    message: e.to_string(),
  })?;
  line.push('\n');
  Ok(line)
}

fn kind(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "an object",
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn item(value: Value) -> Item {
    match value {
      Value::Object(map) => map,
      _ => panic!("test item must be an object"),
    }
  }

  #[test]
  fn test_parse_item_rejects_non_objects() {
    assert!(parse_item(br#"{"id": "a"}"#).is_ok());
    assert!(matches!(
      parse_item(b"[1, 2]"),
      Err(FetchError::Parse { .. })
    ));
    assert!(matches!(
      parse_item(b"<html>"),
      Err(FetchError::Parse { .. })
    ));
  }

  #[test]
  fn test_prepare_item_sets_collection_and_rewrites_assets() {
    let fetched = item(json!({
      "id": "HLS.S30.T10SGD.2021209T183921.v2.0",
      "collection": "stale",
      "properties": {"datetime": "2021-07-28T18:39:21Z"},
      "assets": {
        "B01": {"href": "https://data.lpdaac/lp-prod-protected/HLSS30.020/B01.tif", "type": "image/tiff"},
        "thumbnail": {"href": "https://data.lpdaac/lp-prod-public/HLSS30.020/thumb.jpg"}
      }
    }));

    let prepared = prepare_item(fetched, "HLSS30", "lp-prod-protected").unwrap();

    assert_eq!(prepared["collection"], "HLSS30");
    assert_eq!(
      prepared["assets"]["B01"],
      json!({"href": "s3://lp-prod-protected/HLSS30.020/B01.tif", "type": "image/tiff"})
    );
    assert_eq!(
      prepared["assets"]["thumbnail"]["href"],
      "https://data.lpdaac/lp-prod-public/HLSS30.020/thumb.jpg"
    );
    assert_eq!(prepared["properties"]["datetime"], "2021-07-28T18:39:21Z");
  }

  #[test]
  fn test_prepare_item_requires_assets_object() {
    let missing = item(json!({"id": "a"}));
    assert!(matches!(
      prepare_item(missing, "HLSS30", "lp-prod-protected"),
      Err(FetchError::Item { .. })
    ));

    let wrong = item(json!({"id": "a", "assets": ["B01"]}));
    assert!(matches!(
      prepare_item(wrong, "HLSS30", "lp-prod-protected"),
      Err(FetchError::Item { .. })
    ));
  }

  #[test]
  fn test_line_keeps_fetched_key_order() {
    let fetched = parse_item(
      br#"{"type": "Feature", "stac_version": "1.0.0", "id": "a", "assets": {"B02": {"href": "x"}, "B01": {"href": "y"}}, "collection": "old"}"#,
    )
    .unwrap();

    let prepared = prepare_item(fetched, "HLSS30", "lp-prod-protected").unwrap();

    assert_eq!(
      to_line(&prepared).unwrap(),
      "{\"type\":\"Feature\",\"stac_version\":\"1.0.0\",\"id\":\"a\",\"assets\":{\"B02\":{\"href\":\"x\"},\"B01\":{\"href\":\"y\"}},\"collection\":\"HLSS30\"}\n"
    );
  }

  #[test]
  fn test_to_line_is_single_line() {
    let line = to_line(&item(json!({"id": "a", "assets": {"x": {"href": "h"}}}))).unwrap();
    assert!(line.ends_with('\n'));
    assert_eq!(line.matches('\n').count(), 1);
    let round: Value = serde_json::from_str(line.trim_end()).unwrap();
    assert_eq!(round["id"], "a");
  }
}
