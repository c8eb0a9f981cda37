//! Mock implementations for testing.
//!
//! # Available Mocks
//!
//! - [`MockHttpClient`] - HTTP client with fixed and queued responses
//! - [`InMemoryCredentials`] - In-memory session store
//! - [`RecordingSink`] - Notification sink that records messages
//! - [`ScriptedPrompt`] - Second-factor prompt that replays codes

pub mod credentials;
pub mod http;
pub mod prompt;
pub mod sink;

pub use credentials::InMemoryCredentials;
pub use http::{MockHttpClient, MockResponse, RecordedRequest};
pub use prompt::ScriptedPrompt;
pub use sink::RecordingSink;
