//! Trait abstractions for dependency injection and testability.
//!
//! # Traits
//!
//! - [`HttpClient`] - HTTP client operations (GET, POST)
//! - [`CredentialsProvider`] - Session record storage and retrieval
//! - [`NotificationSink`] - Outbound chat messages
//! - [`SecondFactorPrompt`] - One-time code input

pub mod credentials;
pub mod http;
pub mod notifier;
pub mod prompt;

pub use credentials::{CredentialsError, CredentialsProvider};
pub use http::{Headers, HttpClient, HttpError, Response};
pub use notifier::{NotificationSink, SinkError};
pub use prompt::SecondFactorPrompt;
