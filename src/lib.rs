//! vrcwatch - watches VRChat users' presence and reports changes to Discord.
//!
//! This library exposes modules for use in integration tests.

pub mod adapters;
pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod monitor;
pub mod presence;
pub mod traits;
