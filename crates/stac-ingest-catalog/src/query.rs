//! The catalog query stage.

use std::sync::Arc;
use std::time::Instant;

use stac_ingest_config::GranuleQuery;
use stac_ingest_queue::Queue;
use tracing::{info, instrument};

use crate::client::Catalog;
use crate::error::CatalogError;
use crate::granule::item_urls;
use crate::search::GranuleSearch;

/// Runs one granule query and fans the item urls out onto a queue.
pub struct CatalogQuery {
  catalog: Arc<dyn Catalog>,
  queue: Arc<dyn Queue>,
}

impl CatalogQuery {
  pub fn new(catalog: Arc<dyn Catalog>, queue: Arc<dyn Queue>) -> Self {
    Self { catalog, queue }
  }

  /// Search the catalog and publish one message per item url.
  ///
  /// Returns the published urls in publish order. Any catalog error fails the
  /// whole invocation before anything is published. A publish error stops the
  /// stage; urls sent before it stay sent.
  #[instrument(
    name = "catalog_query",
    skip(self, query),
    fields(short_name = %query.short_name, version = %query.version)
  )]
  pub async fn run(&self, query: &GranuleQuery) -> Result<Vec<String>, CatalogError> {
    query.validate()?;

    info!(
      start_date = %query.start_date,
      end_date = %query.end_date,
      bbox = ?query.bbox.map(|b| b.to_array()),
      "querying granules"
    );

    let started = Instant::now();
    let search = GranuleSearch::from_query(query);
    let granules = self.catalog.search_all(&search).await?;
    let urls = item_urls(&granules);

    info!(
      granules = granules.len(),
      item_urls = urls.len(),
      search_ms = started.elapsed().as_millis() as u64,
      "granule search completed"
    );

    for url in &urls {
      self.queue.send(url).await?;
    }

    info!(
      published = urls.len(),
      elapsed_ms = started.elapsed().as_millis() as u64,
      "item urls published"
    );

    Ok(urls)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::granule::{Granule, Link};
  use async_trait::async_trait;
  use stac_ingest_queue::MemoryQueue;
  use tokio::sync::Mutex;

  /// Catalog returning canned granules and recording every search.
  struct FakeCatalog {
    granules: Vec<Granule>,
    searches: Mutex<Vec<GranuleSearch>>,
    fail: bool,
  }

  impl FakeCatalog {
    fn new(granules: Vec<Granule>) -> Self {
      Self {
        granules,
        searches: Mutex::new(Vec::new()),
        fail: false,
      }
    }

    fn failing() -> Self {
      Self {
        fail: true,
        ..Self::new(vec![])
      }
    }
  }

  #[async_trait]
  impl Catalog for FakeCatalog {
    async fn search_all(&self, search: &GranuleSearch) -> Result<Vec<Granule>, CatalogError> {
      self.searches.lock().await.push(search.clone());
      if self.fail {
        return Err(CatalogError::Status {
          status: 503,
          body: "unavailable".to_string(),
        });
      }
      Ok(self.granules.clone())
    }
  }

  fn granule_with_links(hrefs: &[&str]) -> Granule {
    Granule {
      id: None,
      title: None,
      links: hrefs
        .iter()
        .map(|href| Link {
          href: href.to_string(),
          rel: None,
        })
        .collect(),
    }
  }

  #[tokio::test]
  async fn test_single_item_url_is_published() {
    let item_url = "https://lpdaac/some_granule_stac.json";
    let catalog = Arc::new(FakeCatalog::new(vec![granule_with_links(&[item_url])]));
    let queue = Arc::new(MemoryQueue::new());
    let stage = CatalogQuery::new(catalog.clone(), queue.clone());

    let query = GranuleQuery::from_json(
      r#"{"short_name": "HLSS30", "version": "2.0",
          "start_date": "2021-07-28 05:00:00", "end_date": "2021-07-29 05:00:00",
          "bbox": [-123.75, 35.029996, -110.390625, 44.21371]}"#,
    )
    .unwrap();

    let published = stage.run(&query).await.unwrap();

    assert_eq!(published, vec![item_url]);
    assert_eq!(queue.messages().await, vec![item_url]);

    let searches = catalog.searches.lock().await;
    assert_eq!(searches.len(), 1);
    assert_eq!(searches[0].short_name(), "HLSS30");
    assert_eq!(searches[0].version(), Some("2.0"));
    assert_eq!(
      searches[0].temporal(),
      Some((query.start_date, query.end_date))
    );
    assert_eq!(
      searches[0].bounding_box().map(|b| b.to_array()),
      Some([-123.75, 35.029996, -110.390625, 44.21371])
    );
  }

  #[tokio::test]
  async fn test_query_without_bbox_searches_without_spatial_filter() {
    let catalog = Arc::new(FakeCatalog::new(vec![]));
    let queue = Arc::new(MemoryQueue::new());
    let stage = CatalogQuery::new(catalog.clone(), queue.clone());

    let query = GranuleQuery {
      bbox: None,
      ..GranuleQuery::defaults()
    };
    let published = stage.run(&query).await.unwrap();

    assert!(published.is_empty());
    assert!(queue.messages().await.is_empty());
    let searches = catalog.searches.lock().await;
    assert!(searches[0].bounding_box().is_none());
  }

  #[tokio::test]
  async fn test_only_https_stac_links_are_published() {
    let catalog = Arc::new(FakeCatalog::new(vec![
      granule_with_links(&[
        "https://lpdaac/a.B01.tif",
        "s3://lp-prod-public/a_stac.json",
        "https://lpdaac/a_stac.json",
      ]),
      granule_with_links(&["https://lpdaac/b_stac.json", "https://lpdaac/b.cmr.xml"]),
    ]));
    let queue = Arc::new(MemoryQueue::new());
    let stage = CatalogQuery::new(catalog, queue.clone());

    stage.run(&GranuleQuery::defaults()).await.unwrap();

    assert_eq!(
      queue.messages().await,
      vec!["https://lpdaac/a_stac.json", "https://lpdaac/b_stac.json"]
    );
  }

  #[tokio::test]
  async fn test_catalog_error_publishes_nothing() {
    let catalog = Arc::new(FakeCatalog::failing());
    let queue = Arc::new(MemoryQueue::new());
    let stage = CatalogQuery::new(catalog, queue.clone());

    let err = stage.run(&GranuleQuery::defaults()).await.unwrap_err();

    assert!(matches!(err, CatalogError::Status { status: 503, .. }));
    assert!(queue.messages().await.is_empty());
  }

  #[tokio::test]
  async fn test_invalid_query_never_reaches_catalog() {
    let catalog = Arc::new(FakeCatalog::new(vec![]));
    let queue = Arc::new(MemoryQueue::new());
    let stage = CatalogQuery::new(catalog.clone(), queue);

    let query = GranuleQuery {
      short_name: String::new(),
      ..GranuleQuery::defaults()
    };
    let err = stage.run(&query).await.unwrap_err();

    assert!(matches!(err, CatalogError::Invalid(_)));
    assert!(catalog.searches.lock().await.is_empty());
  }

  #[tokio::test]
  async fn test_publish_failure_keeps_earlier_messages() {
    let catalog = Arc::new(FakeCatalog::new(vec![granule_with_links(&[
      "https://lpdaac/a_stac.json",
      "https://lpdaac/b_stac.json",
      "https://lpdaac/c_stac.json",
    ])]));
    let queue = Arc::new(MemoryQueue::failing_after(2));
    let stage = CatalogQuery::new(catalog, queue.clone());

    let err = stage.run(&GranuleQuery::defaults()).await.unwrap_err();

    assert!(matches!(err, CatalogError::Publish(_)));
    assert_eq!(
      queue.messages().await,
      vec!["https://lpdaac/a_stac.json", "https://lpdaac/b_stac.json"]
    );
  }
}
