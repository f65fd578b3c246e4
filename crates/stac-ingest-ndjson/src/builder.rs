use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use stac_ingest_blob::{Store, once};
use stac_ingest_config::{NDJSON_CONTENT_TYPE, QueueEvent};
use stac_ingest_href::ItemLocation;
use stac_ingest_queue::Queue;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::error::BuildError;
use crate::fetch::ItemSource;
use crate::item::{prepare_item, to_line};

/// Lines buffered between fetch tasks and the writer.
const LINE_CHANNEL_CAPACITY: usize = 64;

/// Summary of one published batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchOutput {
  /// Object key of the batch file, `<uuid>.ndjson`.
  pub key: String,
  /// URI published to the outbound queue.
  pub uri: String,
  /// Number of items written.
  pub items: usize,
}

/// Builds one NDJSON file per batch of item urls.
pub struct NdjsonBuilder {
  source: Arc<dyn ItemSource>,
  store: Arc<dyn Store>,
  queue: Arc<dyn Queue>,
  protected_bucket: String,
}

impl NdjsonBuilder {
  pub fn new(
    source: Arc<dyn ItemSource>,
    store: Arc<dyn Store>,
    queue: Arc<dyn Queue>,
    protected_bucket: impl Into<String>,
  ) -> Self {
    Self {
      source,
      store,
      queue,
      protected_bucket: protected_bucket.into(),
    }
  }

  /// Build the batch delivered by a queue event.
  pub async fn build_event(
    &self,
    event: &QueueEvent,
    cancel: CancellationToken,
  ) -> Result<BatchOutput, BuildError> {
    self.build(&event.bodies(), cancel).await
  }

  /// Fetch every item concurrently, write them as one NDJSON file and
  /// publish its uri.
  ///
  /// All-or-nothing: if any url fails, or `cancel` fires first, no object is
  /// written and nothing is published.
  #[instrument(name = "ndjson_build", skip_all, fields(urls = urls.len()))]
  pub async fn build(
    &self,
    urls: &[String],
    cancel: CancellationToken,
  ) -> Result<BatchOutput, BuildError> {
    if urls.is_empty() {
      return Err(BuildError::EmptyBatch);
    }

    let batch_id = Uuid::new_v4();
    let key = format!("{}.ndjson", batch_id);
    let started = Instant::now();

    // Classify every url up front so a bad scheme fails before any fetch.
    let mut targets = Vec::with_capacity(urls.len());
    for url in urls {
      let location = ItemLocation::parse(url).map_err(|e| BuildError::fetch(url, e))?;
      let collection = location
        .collection()
        .map_err(|e| BuildError::fetch(url, e))?;
      targets.push((location, collection));
    }

    info!(batch_id = %batch_id, items = targets.len(), "batch_started");

    let (tx, rx) = mpsc::channel(LINE_CHANNEL_CAPACITY);
    let writer = tokio::spawn(write_lines(rx));

    let mut handles = Vec::with_capacity(targets.len());
    for (location, collection) in targets {
      let source = self.source.clone();
      let protected_bucket = self.protected_bucket.clone();
      let tx = tx.clone();

      handles.push(tokio::spawn(async move {
        let url = location.to_string();
        let item = source
          .fetch(&location)
          .await
          .map_err(|e| BuildError::fetch(&url, e))?;
        let item = prepare_item(item, &collection, &protected_bucket)
          .map_err(|e| BuildError::fetch(&url, e))?;
        let line = to_line(&item).map_err(|e| BuildError::fetch(&url, e))?;

        debug!(url = %url, collection = %collection, "item_fetched");
        tx.send(line)
          .await
          .map_err(|_| BuildError::task("writer stopped before all items were sent"))
      }));
    }
    // The writer finishes once every fetch task has dropped its sender.
    drop(tx);

    let aborts: Vec<_> = handles.iter().map(JoinHandle::abort_handle).collect();
    let abort_all = || {
      for handle in &aborts {
        handle.abort();
      }
      writer.abort();
    };

    let fetches = futures::future::try_join_all(handles.into_iter().map(|handle| async move {
      handle
        .await
        .map_err(|e| BuildError::task(format!("fetch task join error: {}", e)))?
    }));

    let joined = tokio::select! {
      joined = fetches => joined,
      _ = cancel.cancelled() => {
        abort_all();
        warn!(batch_id = %batch_id, "batch cancelled during fetch");
        return Err(BuildError::Cancelled);
      }
    };

    if let Err(e) = joined {
      abort_all();
      error!(batch_id = %batch_id, error = %e, "batch_failed");
      return Err(e);
    }

    let (body, items) = writer
      .await
      .map_err(|e| BuildError::task(format!("writer join error: {}", e)))?;

    if cancel.is_cancelled() {
      warn!(batch_id = %batch_id, "batch cancelled before write");
      return Err(BuildError::Cancelled);
    }

    self
      .store
      .put(&key, once(body), NDJSON_CONTENT_TYPE)
      .await?;
    let uri = self.store.uri(&key);
    self.queue.send(&uri).await?;

    info!(
      batch_id = %batch_id,
      uri = %uri,
      items,
      elapsed_ms = started.elapsed().as_millis() as u64,
      "batch_published"
    );

    Ok(BatchOutput { key, uri, items })
  }
}

/// Drain completed lines into one buffer, in completion order.
async fn write_lines(mut rx: mpsc::Receiver<String>) -> (Vec<u8>, usize) {
  let mut body = Vec::new();
  let mut items = 0;
  while let Some(line) = rx.recv().await {
    body.extend_from_slice(line.as_bytes());
    items += 1;
  }
  (body, items)
}
