//! Presence data as the monitor sees it.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::api::UserRecord;

/// Location value the upstream reports for signed-out users.
pub const OFFLINE_LOCATION: &str = "offline";

/// Matches the world id at the start of a location string
/// (`wrld_<uuid>:<instance>~<flags>`).
static WORLD_ID_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^wrld_[a-f0-9-]+").expect("Invalid world id regex"));

/// Presence status as reported by the upstream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PresenceState {
    #[serde(rename = "active")]
    Active,
    #[serde(rename = "join me")]
    JoinMe,
    #[serde(rename = "ask me")]
    AskMe,
    #[serde(rename = "busy")]
    Busy,
    #[default]
    #[serde(rename = "offline", other)]
    Offline,
}

impl PresenceState {
    /// Wire and display label.
    pub fn label(&self) -> &'static str {
        match self {
            PresenceState::Active => "active",
            PresenceState::JoinMe => "join me",
            PresenceState::AskMe => "ask me",
            PresenceState::Busy => "busy",
            PresenceState::Offline => "offline",
        }
    }
}

impl fmt::Display for PresenceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Point-in-time view of one tracked user.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusSnapshot {
    pub id: String,
    pub display_name: String,
    pub state: PresenceState,
    /// Raw location string, never empty.
    pub location: String,
    /// Resolved world name when the location is a world instance.
    pub place_name: Option<String>,
    pub last_login: Option<DateTime<Utc>>,
    pub last_activity: Option<DateTime<Utc>>,
    pub last_platform: Option<String>,
    /// Why this snapshot is a placeholder, if it is one.
    pub diagnostic: Option<String>,
}

impl StatusSnapshot {
    /// Build a snapshot from a user record.
    ///
    /// An empty location becomes `"offline"`, and an offline location forces
    /// the offline state whatever status the upstream reported.
    pub fn from_record(record: UserRecord, place_name: Option<String>) -> Self {
        let location = if record.location.is_empty() {
            OFFLINE_LOCATION.to_string()
        } else {
            record.location
        };
        let state = if location == OFFLINE_LOCATION {
            PresenceState::Offline
        } else {
            record.status
        };

        Self {
            id: record.id,
            display_name: record.display_name,
            state,
            location,
            place_name,
            last_login: record.last_login,
            last_activity: record.last_activity,
            last_platform: record.last_platform,
            diagnostic: None,
        }
    }

    /// Stand-in for a user that could not be fetched and was never seen.
    pub fn placeholder(id: impl Into<String>, diagnostic: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: "Unknown".to_string(),
            state: PresenceState::Offline,
            location: OFFLINE_LOCATION.to_string(),
            place_name: None,
            last_login: None,
            last_activity: None,
            last_platform: None,
            diagnostic: Some(diagnostic.into()),
        }
    }

    pub fn is_offline(&self) -> bool {
        self.location == OFFLINE_LOCATION
    }

    /// Where the user is, for display: the world name if known, else the raw location.
    pub fn place(&self) -> &str {
        self.place_name.as_deref().unwrap_or(&self.location)
    }
}

/// Extract the world id from a location string, if it starts with one.
pub fn world_id_from_location(location: &str) -> Option<&str> {
    WORLD_ID_REGEX.find(location).map(|m| m.as_str())
}
