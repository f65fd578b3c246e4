use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream as S3Body;
use tracing::debug;

use crate::{ByteStream, Error, Store, collect};

/// Blob store backed by one S3 bucket.
#[derive(Debug, Clone)]
pub struct S3Store {
  client: Client,
  bucket: String,
}

impl S3Store {
  /// Create a store for `bucket` from a pre-built client.
  pub fn new(client: Client, bucket: impl Into<String>) -> Self {
    Self {
      client,
      bucket: bucket.into(),
    }
  }
}

#[async_trait]
impl Store for S3Store {
  async fn put(&self, key: &str, data: ByteStream, content_type: &str) -> Result<(), Error> {
    let data = collect(data).await?;
    let size = data.len();

    self
      .client
      .put_object()
      .bucket(&self.bucket)
      .key(key)
      .content_type(content_type)
      .body(S3Body::from(data))
      .send()
      .await
      .map_err(|e| Error::backend(key, DisplayErrorContext(&e).to_string()))?;

    debug!(bucket = %self.bucket, key = %key, bytes = size, "object written");
    Ok(())
  }

  fn uri(&self, key: &str) -> String {
    format!("s3://{}/{}", self.bucket, key)
  }
}
