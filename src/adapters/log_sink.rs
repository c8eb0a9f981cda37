//! Notification sink that only writes to the log.
//!
//! Used when no Discord channel is configured, so the monitor still runs and
//! its reports show up locally.

use async_trait::async_trait;

use crate::traits::{NotificationSink, SinkError};

#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn send(&self, content: &str) -> Result<(), SinkError> {
        tracing::info!(target: "vrcwatch::notification", "{}", content);
        Ok(())
    }
}
