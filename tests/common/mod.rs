//! Common test utilities for integration tests.
//!
//! # Example
//!
//! ```ignore
//! let fixture = MonitorFixture::new(
//!     MockHttpConfig::new().with_user("usr_a", "A", "active", "private").build(),
//!     &["usr_a"],
//!     &[],
//! );
//! let mut monitor = fixture.monitor();
//! monitor.run_cycle(true).await.unwrap();
//! assert_eq!(fixture.sink.messages().len(), 1);
//! ```
#![allow(dead_code)]

pub mod mocks;

pub use mocks::*;

use std::sync::Arc;
use std::time::Duration;

use vrcwatch::api::ApiClient;
use vrcwatch::auth::SessionManager;
use vrcwatch::monitor::{ChangeDetector, Notifier, StatusMonitor};
use vrcwatch::presence::{PresenceClient, RetryPolicy};

/// Upstream base URL used with [`MockHttpClient`].
pub const BASE: &str = "https://api.test/api/1";

/// Mention id configured in fixtures.
pub const MENTION_ID: &str = "4242";

/// Owned strings from string literals.
pub fn ids(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

/// API client backed by `http`.
pub fn api_client(http: &MockHttpClient) -> Arc<ApiClient> {
    Arc::new(ApiClient::with_base_url(Arc::new(http.clone()), BASE))
}

/// Everything a monitor needs, with zero-delay retries.
pub struct MonitorFixture {
    pub http: MockHttpClient,
    pub sink: RecordingSink,
    pub api: Arc<ApiClient>,
    pub users: Vec<String>,
    pub favorites: Vec<String>,
}

impl MonitorFixture {
    pub fn new(http: MockHttpClient, users: &[&str], favorites: &[&str]) -> Self {
        let api = api_client(&http);
        Self {
            http,
            sink: RecordingSink::new(),
            api,
            users: ids(users),
            favorites: ids(favorites),
        }
    }

    /// A fresh monitor. Each call starts with empty detector state.
    pub fn monitor(&self) -> StatusMonitor {
        let presence = PresenceClient::new(self.api.clone(), RetryPolicy::immediate(3));
        let detector = ChangeDetector::new(self.favorites.clone())
            .with_mention(Some(MENTION_ID.to_string()));
        StatusMonitor::new(
            self.users.clone(),
            presence,
            detector,
            Notifier::new(Arc::new(self.sink.clone())),
        )
        .with_poll_interval(Duration::from_secs(3600))
    }

    /// A session manager sharing this fixture's API client.
    pub fn session(&self) -> Arc<SessionManager> {
        Arc::new(SessionManager::new(
            self.api.clone(),
            Arc::new(InMemoryCredentials::new()),
        ))
    }
}
