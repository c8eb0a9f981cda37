//! Mock configurations for test fixtures.
//!
//! This module re-exports the mock implementations from `vrcwatch::adapters::mock`
//! and provides builders for common upstream responses.

pub use vrcwatch::adapters::mock::{
    InMemoryCredentials, MockHttpClient, MockResponse, RecordingSink, ScriptedPrompt,
};
pub use vrcwatch::traits::{HttpError, Response};

use serde_json::{json, Value};

use super::BASE;

/// Configuration for setting up mock upstream responses.
pub struct MockHttpConfig {
    client: MockHttpClient,
}

impl MockHttpConfig {
    /// Creates a new mock HTTP configuration.
    pub fn new() -> Self {
        Self {
            client: MockHttpClient::new(),
        }
    }

    /// `GET /users/{id}` always answers with this user.
    pub fn with_user(self, id: &str, name: &str, status: &str, location: &str) -> Self {
        self.client
            .set_response(&user_url(id), ok(user_json(id, name, status, location)));
        self
    }

    /// `GET /users/{id}` always fails with an upstream error status.
    pub fn with_user_error(self, id: &str, status: u16, message: &str) -> Self {
        self.client
            .set_response(&user_url(id), error_status(status, message));
        self
    }

    /// `GET /worlds/{id}` answers with this name.
    pub fn with_world(self, id: &str, name: &str) -> Self {
        self.client.set_response(
            &world_url(id),
            ok(json!({"id": id, "name": name})),
        );
        self
    }

    /// `GET /auth/user` answers with a complete identity.
    pub fn with_current_user(self, name: &str) -> Self {
        self.client.set_response(
            &format!("{}/auth/user", BASE),
            ok(json!({"id": "usr_me", "displayName": name})),
        );
        self
    }

    /// Builds and returns the configured MockHttpClient.
    pub fn build(self) -> MockHttpClient {
        self.client
    }
}

impl Default for MockHttpConfig {
    fn default() -> Self {
        Self::new()
    }
}

pub fn user_url(id: &str) -> String {
    format!("{}/users/{}", BASE, id)
}

pub fn world_url(id: &str) -> String {
    format!("{}/worlds/{}", BASE, id)
}

pub fn user_json(id: &str, name: &str, status: &str, location: &str) -> Value {
    json!({
        "id": id,
        "displayName": name,
        "status": status,
        "location": location,
        "last_login": "2024-05-01T12:00:00.000Z",
        "last_platform": "standalonewindows"
    })
}

pub fn ok(body: Value) -> MockResponse {
    MockResponse::Success(Response::json_body(200, &body))
}

pub fn error_status(status: u16, message: &str) -> MockResponse {
    MockResponse::Success(Response::json_body(
        status,
        &json!({"error": {"message": message, "status_code": status}}),
    ))
}
