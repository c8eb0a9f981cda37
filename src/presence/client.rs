//! Rate-limited, retrying presence polling.
//!
//! Calls are strictly serial. Every user gets up to `max_attempts` tries with
//! a fixed backoff between them, and a pause follows every user whatever the
//! outcome, to stay under the upstream rate limit.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::cache::NameCache;
use super::models::{world_id_from_location, StatusSnapshot};
use crate::api::{ApiClient, ApiError};

/// Default number of tries per user.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default pause between tries for the same user.
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(2);

/// Default pause after each user.
pub const DEFAULT_INTER_ENTITY_DELAY: Duration = Duration::from_secs(1);

/// Retry and pacing settings for a polling batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub retry_backoff: Duration,
    pub inter_entity_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            inter_entity_delay: DEFAULT_INTER_ENTITY_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Same number of attempts, no waiting at all.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            retry_backoff: Duration::ZERO,
            inter_entity_delay: Duration::ZERO,
        }
    }
}

/// Polls user presence and resolves world names.
pub struct PresenceClient {
    api: Arc<ApiClient>,
    policy: RetryPolicy,
    names: NameCache,
    /// Last snapshot handed out per requested id.
    last_known: HashMap<String, StatusSnapshot>,
    last_batch_unauthorized: bool,
}

impl PresenceClient {
    pub fn new(api: Arc<ApiClient>, policy: RetryPolicy) -> Self {
        Self {
            api,
            policy,
            names: NameCache::new(),
            last_known: HashMap::new(),
            last_batch_unauthorized: false,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetch one snapshot per id, in order.
    ///
    /// Never fails and never drops a user: when every try fails, the last
    /// snapshot for that id is reused, or a placeholder if there is none.
    pub async fn fetch_statuses(&mut self, ids: &[String]) -> Vec<StatusSnapshot> {
        let mut results = Vec::with_capacity(ids.len());
        let mut unauthorized = 0usize;

        for id in ids {
            let snapshot = match self.fetch_one(id).await {
                Ok(snapshot) => snapshot,
                Err(err) => {
                    if err.is_unauthorized() {
                        unauthorized += 1;
                    }
                    warn!(
                        "Giving up on {} after {} attempts: {}",
                        id, self.policy.max_attempts, err
                    );
                    match self.last_known.get(id) {
                        Some(previous) => previous.clone(),
                        None => StatusSnapshot::placeholder(id.as_str(), err.diagnostic()),
                    }
                }
            };

            self.last_known.insert(id.clone(), snapshot.clone());
            results.push(snapshot);
            pause(self.policy.inter_entity_delay).await;
        }

        self.last_batch_unauthorized = !ids.is_empty() && unauthorized == ids.len();
        results
    }

    async fn fetch_one(&mut self, id: &str) -> Result<StatusSnapshot, ApiError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.api.get_user(id).await {
                Ok(record) => {
                    let world_id = world_id_from_location(&record.location).map(str::to_string);
                    let place_name = match world_id {
                        Some(world_id) => Some(self.resolve_place_name(&world_id).await),
                        None => None,
                    };
                    // Keyed by the requested id whatever the upstream echoes.
                    let mut snapshot = StatusSnapshot::from_record(record, place_name);
                    snapshot.id = id.to_string();
                    return Ok(snapshot);
                }
                Err(err) if attempt < max_attempts => {
                    warn!(
                        "Fetching {} failed (attempt {}/{}): {}",
                        id, attempt, max_attempts, err
                    );
                    attempt += 1;
                    pause(self.policy.retry_backoff).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// World name for `world_id`, looked up at most once per process.
    ///
    /// Falls back to the id itself when the lookup fails or has no name.
    pub async fn resolve_place_name(&mut self, world_id: &str) -> String {
        if let Some(name) = self.names.get(world_id) {
            return name.to_string();
        }

        let name = match self.api.get_world(world_id).await {
            Ok(world) => world
                .name
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| world_id.to_string()),
            Err(err) => {
                debug!("World lookup for {} failed: {}", world_id, err);
                world_id.to_string()
            }
        };
        self.names.insert(world_id, name.clone());
        name
    }

    /// True when the last batch was non-empty and every user in it ended
    /// on a 401.
    pub fn last_batch_unauthorized(&self) -> bool {
        self.last_batch_unauthorized
    }
}

async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}

impl std::fmt::Debug for PresenceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresenceClient")
            .field("policy", &self.policy)
            .field("cached_names", &self.names.len())
            .field("known_users", &self.last_known.len())
            .finish()
    }
}
