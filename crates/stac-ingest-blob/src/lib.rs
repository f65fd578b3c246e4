//! stac-ingest Blob
//!
//! This crate provides the blob storage trait batch files are written
//! through. A batch file is written once under a unique key; reading it back
//! is the downstream loader's business, so the trait only writes.
//!
//! The [`Store`] trait is bucket-scoped: implementations are constructed for
//! one destination and translate keys into their own object names. Bodies are
//! passed as byte streams so large batches need not be copied again on the
//! way out.

mod memory;
mod s3;

pub use memory::{MemoryStore, StoredBlob};
pub use s3::S3Store;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use std::pin::Pin;

/// A boxed stream of bytes for blob data.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, Error>> + Send>>;

/// Error type for blob storage operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
  /// The storage backend failed.
  #[error("storage error for '{key}': {message}")]
  Backend { key: String, message: String },
}

impl Error {
  pub fn backend(key: impl Into<String>, message: impl Into<String>) -> Self {
    Self::Backend {
      key: key.into(),
      message: message.into(),
    }
  }
}

/// Blob storage trait.
#[async_trait]
pub trait Store: Send + Sync {
  /// Store a blob.
  async fn put(&self, key: &str, data: ByteStream, content_type: &str) -> Result<(), Error>;

  /// The URI downstream consumers use to address `key`.
  fn uri(&self, key: &str) -> String;
}

/// Wrap an in-memory body as a single-chunk stream.
pub fn once(data: impl Into<Bytes>) -> ByteStream {
  let data: Bytes = data.into();
  Box::pin(futures::stream::once(async move { Ok(data) }))
}

/// Drain a stream into one contiguous buffer.
pub async fn collect(mut stream: ByteStream) -> Result<Bytes, Error> {
  let mut buffer = BytesMut::new();
  while let Some(chunk) = stream.next().await {
    buffer.extend_from_slice(&chunk?);
  }
  Ok(buffer.freeze())
}
