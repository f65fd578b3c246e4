use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use stac_ingest_href::ItemLocation;
use tracing::debug;

use crate::error::FetchError;
use crate::item::{Item, parse_item};

/// Something that can read one STAC item document.
#[async_trait]
pub trait ItemSource: Send + Sync {
  /// Fetch and parse the item at `location`. Never cached.
  async fn fetch(&self, location: &ItemLocation) -> Result<Item, FetchError>;
}

/// Reads items over HTTP(S) and from S3.
#[derive(Debug, Clone)]
pub struct RemoteItemSource {
  http: reqwest::Client,
  s3: aws_sdk_s3::Client,
}

impl RemoteItemSource {
  /// `s3` is used for every `s3://` item and should already carry any
  /// assumed-role credentials.
  pub fn new(http: reqwest::Client, s3: aws_sdk_s3::Client) -> Self {
    Self { http, s3 }
  }

  async fn fetch_http(&self, url: &reqwest::Url) -> Result<Vec<u8>, FetchError> {
    let response = self.http.get(url.clone()).send().await?;
    let status = response.status();
    if !status.is_success() {
      return Err(FetchError::Status {
        status: status.as_u16(),
      });
    }
    Ok(response.bytes().await?.to_vec())
  }

  async fn fetch_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, FetchError> {
    let output = self
      .s3
      .get_object()
      .bucket(bucket)
      .key(key)
      .send()
      .await
      .map_err(|e| FetchError::object(DisplayErrorContext(&e).to_string()))?;

    let body = output
      .body
      .collect()
      .await
      .map_err(|e| FetchError::object(e.to_string()))?;
    Ok(body.into_bytes().to_vec())
  }
}

#[async_trait]
impl ItemSource for RemoteItemSource {
  async fn fetch(&self, location: &ItemLocation) -> Result<Item, FetchError> {
    let body = match location {
      ItemLocation::Http(url) => self.fetch_http(url).await?,
      ItemLocation::S3 { bucket, key, .. } => self.fetch_object(bucket, key).await?,
    };
    debug!(url = %location, bytes = body.len(), "item body received");
    parse_item(&body)
  }
}
