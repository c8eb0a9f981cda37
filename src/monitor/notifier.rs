//! Best-effort delivery of reports to the notification sink.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::detector::CycleReport;
use crate::traits::NotificationSink;

/// Sent once when monitoring begins.
pub const STARTED_MESSAGE: &str = "VRChat monitoring started.";

/// Sent once when monitoring ends.
pub const STOPPED_MESSAGE: &str = "VRChat monitoring stopped.";

/// Forwards formatted text to a sink, logging and dropping failures.
#[derive(Clone)]
pub struct Notifier {
    sink: Arc<dyn NotificationSink>,
}

impl Notifier {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink }
    }

    /// Deliver one message. Returns whether the sink accepted it.
    pub async fn send(&self, content: &str) -> bool {
        match self.sink.send(content).await {
            Ok(()) => {
                debug!("Notification delivered ({} chars)", content.chars().count());
                true
            }
            Err(e) => {
                warn!("Failed to deliver notification: {}", e);
                false
            }
        }
    }

    /// Log a lifecycle message locally and send it.
    pub async fn announce(&self, message: &str) {
        info!("{}", message);
        self.send(message).await;
    }

    /// Send a cycle's alerts, then its batch report if it passed the throttle.
    pub async fn deliver(&self, report: &CycleReport) {
        for alert in &report.alerts {
            self.send(alert).await;
        }
        if report.should_send {
            self.send(&format_batch(&report.text)).await;
        }
    }
}

/// Wrap a batch report in a chat block quote.
pub fn format_batch(text: &str) -> String {
    format!(">>> {}", text)
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier").finish_non_exhaustive()
    }
}
