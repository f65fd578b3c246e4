use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::Mutex;

use crate::{ByteStream, Error, Store, collect};

/// A blob held by [`MemoryStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct StoredBlob {
  pub data: Bytes,
  pub content_type: String,
}

/// In-process blob store used by tests.
#[derive(Debug)]
pub struct MemoryStore {
  bucket: String,
  blobs: Mutex<HashMap<String, StoredBlob>>,
}

impl MemoryStore {
  pub fn new(bucket: impl Into<String>) -> Self {
    Self {
      bucket: bucket.into(),
      blobs: Mutex::new(HashMap::new()),
    }
  }

  /// Keys currently stored, sorted.
  pub async fn keys(&self) -> Vec<String> {
    let mut keys: Vec<String> = self.blobs.lock().await.keys().cloned().collect();
    keys.sort();
    keys
  }

  /// Fetch a stored blob without streaming.
  pub async fn blob(&self, key: &str) -> Option<StoredBlob> {
    self.blobs.lock().await.get(key).cloned()
  }
}

#[async_trait]
impl Store for MemoryStore {
  async fn put(&self, key: &str, data: ByteStream, content_type: &str) -> Result<(), Error> {
    let data = collect(data).await?;
    self.blobs.lock().await.insert(
      key.to_string(),
      StoredBlob {
        data,
        content_type: content_type.to_string(),
      },
    );
    Ok(())
  }

  fn uri(&self, key: &str) -> String {
    format!("memory://{}/{}", self.bucket, key)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::once;

  #[tokio::test]
  async fn test_put_keeps_body_and_content_type() {
    let store = MemoryStore::new("ndjson");
    store
      .put("a.ndjson", once("{}\n"), "application/x-ndjson")
      .await
      .unwrap();

    let blob = store.blob("a.ndjson").await.unwrap();
    assert_eq!(&blob.data[..], b"{}\n");
    assert_eq!(blob.content_type, "application/x-ndjson");
  }

  #[tokio::test]
  async fn test_put_overwrites_same_key() {
    let store = MemoryStore::new("ndjson");
    store.put("a", once("x"), "text/plain").await.unwrap();
    store.put("a", once("y"), "text/plain").await.unwrap();

    assert_eq!(store.keys().await, vec!["a"]);
    assert_eq!(&store.blob("a").await.unwrap().data[..], b"y");
  }

  #[tokio::test]
  async fn test_missing_key() {
    let store = MemoryStore::new("ndjson");
    assert!(store.blob("nope").await.is_none());
    assert!(store.keys().await.is_empty());
  }

  #[test]
  fn test_uri_names_bucket() {
    let store = MemoryStore::new("ndjson");
    assert_eq!(store.uri("1.ndjson"), "memory://ndjson/1.ndjson");
  }
}
