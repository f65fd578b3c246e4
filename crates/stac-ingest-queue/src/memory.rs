use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{Error, Queue};

/// In-process queue that records every message it is sent.
#[derive(Debug, Default)]
pub struct MemoryQueue {
  messages: Mutex<Vec<String>>,
  fail_after: Option<usize>,
}

impl MemoryQueue {
  pub fn new() -> Self {
    Self::default()
  }

  /// A queue that accepts `count` messages and rejects every later one.
  pub fn failing_after(count: usize) -> Self {
    Self {
      messages: Mutex::new(Vec::new()),
      fail_after: Some(count),
    }
  }

  /// Messages received so far, in send order.
  pub async fn messages(&self) -> Vec<String> {
    self.messages.lock().await.clone()
  }
}

#[async_trait]
impl Queue for MemoryQueue {
  async fn send(&self, body: &str) -> Result<(), Error> {
    let mut messages = self.messages.lock().await;
    if let Some(limit) = self.fail_after
      && messages.len() >= limit
    {
      return Err(Error::Send {
        queue: "memory".to_string(),
        message: format!("queue accepts at most {} messages", limit),
      });
    }
    messages.push(body.to_string());
    Ok(())
  }
}
