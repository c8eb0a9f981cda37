//! Recording notification sink for testing.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::traits::{NotificationSink, SinkError};

/// Sink that keeps every message it was asked to send.
///
/// Failed sends are still recorded under `attempts`, but not `messages`.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    messages: Arc<Mutex<Vec<String>>>,
    attempts: Arc<Mutex<usize>>,
    should_fail: Arc<Mutex<bool>>,
}

impl RecordingSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent send fail.
    pub fn set_should_fail(&self, should_fail: bool) {
        *self.should_fail.lock().unwrap() = should_fail;
    }

    /// Messages delivered so far.
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    /// Number of send calls, successful or not.
    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.messages.lock().unwrap().clear();
        *self.attempts.lock().unwrap() = 0;
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn send(&self, content: &str) -> Result<(), SinkError> {
        *self.attempts.lock().unwrap() += 1;
        if *self.should_fail.lock().unwrap() {
            return Err(SinkError::Transport("Mock sink failure".to_string()));
        }
        self.messages.lock().unwrap().push(content.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_messages() {
        let sink = RecordingSink::new();
        sink.send("one").await.unwrap();
        sink.send("two").await.unwrap();
        assert_eq!(sink.messages(), vec!["one", "two"]);
        assert_eq!(sink.attempts(), 2);
    }

    #[tokio::test]
    async fn test_failure_counts_attempt_only() {
        let sink = RecordingSink::new();
        sink.set_should_fail(true);
        assert!(sink.send("lost").await.is_err());
        assert!(sink.messages().is_empty());
        assert_eq!(sink.attempts(), 1);
    }
}
