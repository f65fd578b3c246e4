use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use stac_ingest_config::CatalogConfig;
use tracing::debug;

use crate::error::CatalogError;
use crate::granule::Granule;
use crate::search::GranuleSearch;

/// Response header carrying the total number of matching granules.
pub const HITS_HEADER: &str = "cmr-hits";

/// Response header carrying the opaque cursor for the next page; sent back
/// as a request header of the same name.
pub const SEARCH_AFTER_HEADER: &str = "cmr-search-after";

/// A searchable granule catalog.
#[async_trait]
pub trait Catalog: Send + Sync {
  /// Return every granule matching `search`, across all result pages.
  async fn search_all(&self, search: &GranuleSearch) -> Result<Vec<Granule>, CatalogError>;
}

#[derive(Debug, Deserialize)]
struct FeedResponse {
  feed: Feed,
}

#[derive(Debug, Deserialize)]
struct Feed {
  #[serde(default)]
  entry: Vec<Granule>,
}

/// HTTP client for the CMR granule search API.
#[derive(Debug, Clone)]
pub struct CmrClient {
  client: Client,
  config: CatalogConfig,
}

impl CmrClient {
  pub fn new(config: CatalogConfig) -> Result<Self, CatalogError> {
    config.validate()?;
    let client = Client::builder()
      .connect_timeout(Duration::from_secs(30))
      .user_agent(concat!("stac-ingest/", env!("CARGO_PKG_VERSION")))
      .build()?;
    Ok(Self { client, config })
  }

  async fn fetch_page(
    &self,
    params: &[(&'static str, String)],
    search_after: Option<&str>,
  ) -> Result<Response, CatalogError> {
    let mut request = self
      .client
      .get(&self.config.search_url)
      .query(params)
      .query(&[("page_size", self.config.page_size)]);

    if let Some(cursor) = search_after {
      request = request.header(SEARCH_AFTER_HEADER, cursor);
    }

    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(CatalogError::Status {
        status: status.as_u16(),
        body,
      });
    }
    Ok(response)
  }
}

#[async_trait]
impl Catalog for CmrClient {
  async fn search_all(&self, search: &GranuleSearch) -> Result<Vec<Granule>, CatalogError> {
    let params = search.params();
    let page_size = self.config.page_size as usize;
    let mut granules = Vec::new();
    let mut search_after: Option<String> = None;

    loop {
      let response = self.fetch_page(&params, search_after.as_deref()).await?;

      let hits = header(&response, HITS_HEADER).and_then(|v| v.parse::<u64>().ok());
      let next = header(&response, SEARCH_AFTER_HEADER);

      let page: FeedResponse = response.json().await.map_err(|e| CatalogError::Decode {
        message: e.to_string(),
      })?;
      let received = page.feed.entry.len();
      granules.extend(page.feed.entry);

      debug!(
        received,
        total = granules.len(),
        hits = ?hits,
        "catalog page received"
      );

      // A short page is the last one; so is a full page without a cursor.
      match next {
        Some(cursor) if received >= page_size => search_after = Some(cursor),
        _ => break,
      }
    }

    Ok(granules)
  }
}

fn header(response: &Response, name: &str) -> Option<String> {
  response
    .headers()
    .get(name)
    .and_then(|v| v.to_str().ok())
    .map(str::to_string)
}
