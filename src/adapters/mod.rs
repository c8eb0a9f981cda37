//! Concrete implementations of trait abstractions.
//!
//! These adapters implement the traits defined in `crate::traits` for
//! production use. The binary wires them together; the library only sees the
//! traits.
//!
//! # Adapters
//!
//! - [`ReqwestHttpClient`] - HTTP client using reqwest
//! - [`FileCredentialsProvider`] - File-based session storage
//! - [`DiscordSink`] - Discord channel notifications over REST
//! - [`LogSink`] - Notifications written to the log only
//! - [`TerminalPrompt`] - One-time codes typed on stdin
//!
//! # Mock Implementations
//!
//! The [`mock`] submodule provides test doubles:
//! - [`mock::MockHttpClient`] - Configurable HTTP responses
//! - [`mock::InMemoryCredentials`] - In-memory session storage
//! - [`mock::RecordingSink`] - Captures sent notifications
//! - [`mock::ScriptedPrompt`] - Replays one-time codes

pub mod discord;
pub mod file_credentials;
pub mod log_sink;
pub mod mock;
pub mod reqwest_http;
pub mod terminal_prompt;

pub use discord::DiscordSink;
pub use file_credentials::FileCredentialsProvider;
pub use log_sink::LogSink;
pub use mock::{InMemoryCredentials, MockHttpClient, RecordingSink, ScriptedPrompt};
pub use reqwest_http::ReqwestHttpClient;
pub use terminal_prompt::TerminalPrompt;
