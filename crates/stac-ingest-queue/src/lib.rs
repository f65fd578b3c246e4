//! stac-ingest Queue
//!
//! The [`Queue`] trait is the outbound side of a pipeline stage: every
//! message is one opaque string body. The catalog query stage publishes item
//! URLs; the NDJSON builder publishes batch file URIs.
//!
//! [`SqsQueue`] is the production implementation. [`MemoryQueue`] records
//! messages in process for tests.

mod memory;
mod sqs;

pub use memory::MemoryQueue;
pub use sqs::SqsQueue;

use async_trait::async_trait;

/// Error type for queue operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
  /// The queue rejected or failed to accept the message.
  #[error("failed to send message to {queue}: {message}")]
  Send { queue: String, message: String },
}

/// A queue accepting string messages.
#[async_trait]
pub trait Queue: Send + Sync {
  /// Publish one message.
  async fn send(&self, body: &str) -> Result<(), Error>;
}
