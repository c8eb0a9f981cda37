//! Notification sink trait abstraction.
//!
//! The sink is the outbound side of the chat platform: it takes one formatted
//! text payload and delivers it to a preconfigured channel.

use async_trait::async_trait;

/// Errors returned by a notification sink.
#[derive(Debug, Clone)]
pub enum SinkError {
    /// Transport-level failure
    Transport(String),
    /// The platform rejected the message
    Rejected { status: u16, message: String },
}

impl std::fmt::Display for SinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SinkError::Transport(msg) => write!(f, "Sink transport error: {}", msg),
            SinkError::Rejected { status, message } => {
                write!(f, "Sink rejected message ({}): {}", status, message)
            }
        }
    }
}

impl std::error::Error for SinkError {}

/// Trait for delivering formatted notifications.
///
/// Delivery is best-effort. Callers log failures and move on.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver a single text payload.
    async fn send(&self, content: &str) -> Result<(), SinkError>;
}
