use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A batch of queue messages as delivered to the NDJSON builder.
///
/// Only the message bodies are read; every other record attribute the queue
/// attaches is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueEvent {
  #[serde(rename = "Records")]
  pub records: Vec<QueueRecord>,
}

/// One message within a [`QueueEvent`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueRecord {
  pub body: String,
}

impl QueueEvent {
  /// Parse a batch event, rejecting one that carries no records.
  pub fn from_json(input: &str) -> Result<Self, ConfigError> {
    let event: QueueEvent = serde_json::from_str(input)?;
    if event.records.is_empty() {
      return Err(ConfigError::EmptyEvent);
    }
    Ok(event)
  }

  /// Message bodies in delivery order.
  pub fn bodies(&self) -> Vec<String> {
    self.records.iter().map(|r| r.body.clone()).collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_queue_event() {
    let event = QueueEvent::from_json(
      r#"{"Records": [
        {"messageId": "1", "body": "https://example.com/a_stac.json", "attributes": {}},
        {"messageId": "2", "body": "s3://bucket/S30/b.json"}
      ]}"#,
    )
    .unwrap();

    assert_eq!(
      event.bodies(),
      vec![
        "https://example.com/a_stac.json".to_string(),
        "s3://bucket/S30/b.json".to_string()
      ]
    );
  }

  #[test]
  fn test_empty_event_is_rejected() {
    let err = QueueEvent::from_json(r#"{"Records": []}"#).unwrap_err();
    assert!(matches!(err, ConfigError::EmptyEvent));
  }

  #[test]
  fn test_record_without_body_is_rejected() {
    let err = QueueEvent::from_json(r#"{"Records": [{"messageId": "1"}]}"#).unwrap_err();
    assert!(err.to_string().contains("body"));
  }
}
