//! HTTP client for the VRChat API.
//!
//! Every request carries the configured `User-Agent` (the upstream rejects
//! anonymous agents) and, once a session exists, its `Cookie` header.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::de::DeserializeOwned;
use std::sync::{Arc, RwLock};

use super::error::ApiError;
use super::models::{UserRecord, VerifyResponse, WorldRecord};
use crate::auth::identity::{Identity, TwoFactorMethod};
use crate::auth::store::SessionTokens;
use crate::traits::{Headers, HttpClient, Response};

/// Default URL for the VRChat API.
pub const DEFAULT_API_URL: &str = "https://api.vrchat.cloud/api/1";

/// Default `User-Agent` sent with every request.
pub const DEFAULT_USER_AGENT: &str = concat!("vrcwatch/", env!("CARGO_PKG_VERSION"));

/// A decoded body together with any cookies the server set.
#[derive(Debug, Clone)]
pub struct ApiReply<T> {
    pub value: T,
    pub set_cookies: Vec<String>,
}

/// Client for the upstream presence API.
pub struct ApiClient {
    base_url: String,
    user_agent: String,
    http: Arc<dyn HttpClient>,
    /// Current `Cookie` header; written by the session manager only.
    cookie_header: RwLock<Option<String>>,
}

impl ApiClient {
    /// Create a client against the default base URL.
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self::with_base_url(http, DEFAULT_API_URL)
    }

    /// Create a client against a custom base URL.
    pub fn with_base_url(http: Arc<dyn HttpClient>, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            http,
            cookie_header: RwLock::new(None),
        }
    }

    /// Override the `User-Agent`.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Install the cookies used for subsequent requests.
    pub fn set_session(&self, tokens: &SessionTokens) {
        let header = tokens.cookie_header();
        match self.cookie_header.write() {
            Ok(mut guard) => *guard = header,
            Err(poisoned) => *poisoned.into_inner() = header,
        }
    }

    /// Whether a `Cookie` header is currently installed.
    pub fn has_session(&self) -> bool {
        self.current_cookie().is_some()
    }

    fn current_cookie(&self) -> Option<String> {
        match self.cookie_header.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn headers(&self) -> Headers {
        let mut headers = Headers::new();
        headers.insert("User-Agent".to_string(), self.user_agent.clone());
        if let Some(cookie) = self.current_cookie() {
            headers.insert("Cookie".to_string(), cookie);
        }
        headers
    }

    fn decode<T: DeserializeOwned>(response: Response) -> Result<ApiReply<T>, ApiError> {
        if !response.is_success() {
            return Err(ApiError::from_response(&response));
        }
        let value = response.json::<T>()?;
        Ok(ApiReply {
            value,
            set_cookies: response.set_cookies,
        })
    }

    /// "Who am I" with the current session.
    ///
    /// GET /auth/user
    pub async fn current_user(&self) -> Result<ApiReply<Identity>, ApiError> {
        let response = self.http.get(&self.url("/auth/user"), &self.headers()).await?;
        Self::decode(response)
    }

    /// Primary authentication with HTTP Basic credentials.
    ///
    /// GET /auth/user
    ///
    /// Both parts are URL-encoded before base64, as the upstream requires for
    /// passwords containing `:` or non-ASCII characters.
    pub async fn login_basic(
        &self,
        username: &str,
        password: &str,
    ) -> Result<ApiReply<Identity>, ApiError> {
        let raw = format!(
            "{}:{}",
            urlencoding::encode(username),
            urlencoding::encode(password)
        );
        let mut headers = self.headers();
        headers.insert(
            "Authorization".to_string(),
            format!("Basic {}", STANDARD.encode(raw)),
        );

        let response = self.http.get(&self.url("/auth/user"), &headers).await?;
        Self::decode(response)
    }

    /// Submit a one-time code.
    ///
    /// POST /auth/twofactorauth/{emailotp,totp}/verify
    pub async fn verify_second_factor(
        &self,
        method: &TwoFactorMethod,
        code: &str,
    ) -> Result<ApiReply<VerifyResponse>, ApiError> {
        let path = method.verify_path().ok_or_else(|| ApiError::Status {
            status: 400,
            message: format!("Unsupported second factor method: {}", method),
        })?;

        let mut headers = self.headers();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        let body = serde_json::json!({ "code": code }).to_string();

        let response = self.http.post(&self.url(path), &body, &headers).await?;
        Self::decode(response)
    }

    /// Look up a user by id.
    ///
    /// GET /users/{id}
    pub async fn get_user(&self, user_id: &str) -> Result<UserRecord, ApiError> {
        let url = self.url(&format!("/users/{}", urlencoding::encode(user_id)));
        let response = self.http.get(&url, &self.headers()).await?;
        Self::decode(response).map(|reply| reply.value)
    }

    /// Look up a world by id.
    ///
    /// GET /worlds/{id}
    pub async fn get_world(&self, world_id: &str) -> Result<WorldRecord, ApiError> {
        let url = self.url(&format!("/worlds/{}", urlencoding::encode(world_id)));
        let response = self.http.get(&url, &self.headers()).await?;
        Self::decode(response).map(|reply| reply.value)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("user_agent", &self.user_agent)
            .field("has_session", &self.has_session())
            .finish()
    }
}
