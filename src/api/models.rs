//! Wire types for the upstream presence API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

use crate::presence::models::PresenceState;

/// Response from `GET /users/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserRecord {
    pub id: String,
    #[serde(rename = "displayName", default)]
    pub display_name: String,
    #[serde(default)]
    pub status: PresenceState,
    /// `offline`, `private`, `traveling` or `wrld_...:instance`.
    #[serde(default)]
    pub location: String,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub last_login: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub last_activity: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_platform: Option<String>,
}

/// Response from `GET /worlds/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct WorldRecord {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Response from the second-factor verify endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyResponse {
    #[serde(default)]
    pub verified: bool,
}

/// Upstream timestamps are RFC 3339, but may be `""` or missing for
/// accounts that hide them. Anything unparseable becomes `None`.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }))
}
