//! Presence polling: snapshots, the world-name cache and the retrying client.

pub mod cache;
pub mod client;
pub mod models;

pub use cache::NameCache;
pub use client::{PresenceClient, RetryPolicy};
pub use models::{world_id_from_location, PresenceState, StatusSnapshot, OFFLINE_LOCATION};
