//! Client for the upstream presence API (VRChat).

pub mod client;
pub mod error;
pub mod models;

pub use client::{ApiClient, ApiReply, DEFAULT_API_URL, DEFAULT_USER_AGENT};
pub use error::ApiError;
pub use models::{UserRecord, VerifyResponse, WorldRecord};
