use async_trait::async_trait;
use aws_sdk_sqs::Client;
use aws_sdk_sqs::error::DisplayErrorContext;
use tracing::debug;

use crate::{Error, Queue};

/// Queue backed by an SQS queue URL.
#[derive(Debug, Clone)]
pub struct SqsQueue {
  client: Client,
  queue_url: String,
}

impl SqsQueue {
  /// Create a queue from a pre-built client.
  pub fn new(client: Client, queue_url: impl Into<String>) -> Self {
    Self {
      client,
      queue_url: queue_url.into(),
    }
  }
}

#[async_trait]
impl Queue for SqsQueue {
  async fn send(&self, body: &str) -> Result<(), Error> {
    let output = self
      .client
      .send_message()
      .queue_url(&self.queue_url)
      .message_body(body)
      .send()
      .await
      .map_err(|e| Error::Send {
        queue: self.queue_url.clone(),
        message: DisplayErrorContext(&e).to_string(),
      })?;

    debug!(
      queue_url = %self.queue_url,
      message_id = output.message_id().unwrap_or_default(),
      "message sent"
    );
    Ok(())
  }
}
