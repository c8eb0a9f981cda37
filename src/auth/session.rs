//! Session state machine.
//!
//! `SessionManager` owns the authentication state for the process: it reloads
//! a persisted session, logs in with a username and password, walks the
//! second-factor challenge, and persists every cookie the upstream hands out.
//!
//! ```text
//! Unauthenticated ──login──▶ AwaitingSecondFactor ──verify + login──▶ Authenticated
//!        │                                                               ▲
//!        └──────────────────────── login (no 2FA) ───────────────────────┘
//! any login/verify error with no way forward ──▶ AuthFailed
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tracing::{debug, info, warn};

use super::identity::{Identity, TwoFactorMethod};
use super::store::SessionTokens;
use crate::api::ApiClient;
use crate::error::AuthError;
use crate::traits::{CredentialsProvider, SecondFactorPrompt};

/// Where the session currently stands.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// No usable session.
    Unauthenticated,
    /// Password accepted, one or more one-time codes outstanding.
    AwaitingSecondFactor(Vec<TwoFactorMethod>),
    /// Fully signed in.
    Authenticated(Identity),
    /// The last attempt failed and needs new input.
    AuthFailed(String),
}

/// Username and password remembered for non-interactive re-login.
#[derive(Clone)]
struct RememberedLogin {
    username: String,
    password: String,
}

struct SessionInner {
    state: SessionState,
    tokens: SessionTokens,
    identity: Option<Identity>,
    login: Option<RememberedLogin>,
}

/// Owns the authenticated session shared with the presence client.
pub struct SessionManager {
    api: Arc<ApiClient>,
    store: Arc<dyn CredentialsProvider>,
    inner: Mutex<SessionInner>,
}

impl SessionManager {
    /// Create a manager with no session loaded yet.
    pub fn new(api: Arc<ApiClient>, store: Arc<dyn CredentialsProvider>) -> Self {
        Self {
            api,
            store,
            inner: Mutex::new(SessionInner {
                state: SessionState::Unauthenticated,
                tokens: SessionTokens::new(),
                identity: None,
                login: None,
            }),
        }
    }

    /// The API client this manager authenticates.
    pub fn api(&self) -> &Arc<ApiClient> {
        &self.api
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> SessionState {
        self.lock().state.clone()
    }

    fn lock(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: SessionState) {
        self.lock().state = state;
    }

    fn fail(&self, err: AuthError) -> AuthError {
        self.set_state(SessionState::AuthFailed(err.to_string()));
        err
    }

    /// Load the persisted session and check it is still accepted.
    ///
    /// Returns `false` when nothing is stored, the store cannot be read, or
    /// the upstream no longer accepts the session. Never an error.
    pub async fn try_load_session(&self) -> bool {
        let tokens = match self.store.load().await {
            Ok(Some(tokens)) => tokens,
            Ok(None) => {
                debug!("No saved session");
                return false;
            }
            Err(e) => {
                warn!("Could not read saved session: {}", e);
                return false;
            }
        };

        self.api.set_session(&tokens);
        self.lock().tokens = tokens;
        self.validate().await
    }

    /// One "who am I" call with the current cookies.
    async fn validate(&self) -> bool {
        match self.api.current_user().await {
            Ok(reply) => {
                self.absorb_cookies(&reply.set_cookies).await;
                let identity = reply.value;
                if identity.is_complete() {
                    let mut inner = self.lock();
                    inner.state = SessionState::Authenticated(identity.clone());
                    inner.identity = Some(identity);
                    true
                } else {
                    debug!("Saved session still needs a second factor");
                    false
                }
            }
            Err(e) if e.is_unauthorized() => {
                info!("Saved session was rejected, discarding it");
                self.forget_session().await;
                false
            }
            Err(e) => {
                debug!("Session validation failed: {}", e.diagnostic());
                false
            }
        }
    }

    /// Drop the cookies in memory and on disk.
    async fn forget_session(&self) {
        {
            let mut inner = self.lock();
            inner.tokens = SessionTokens::new();
            inner.identity = None;
        }
        self.api.set_session(&SessionTokens::new());
        if let Err(e) = self.store.clear().await {
            warn!("Failed to clear saved session: {}", e);
        }
    }

    /// Primary authentication with username and password.
    ///
    /// The returned identity may still list pending second-factor methods.
    pub async fn login(&self, username: &str, password: &str) -> Result<Identity, AuthError> {
        let reply = match self.api.login_basic(username, password).await {
            Ok(reply) => reply,
            Err(e) => return Err(self.fail(AuthError::from_login(e))),
        };
        self.absorb_cookies(&reply.set_cookies).await;

        let identity = reply.value;
        let mut inner = self.lock();
        inner.login = Some(RememberedLogin {
            username: username.to_string(),
            password: password.to_string(),
        });
        if identity.needs_second_factor() {
            inner.state =
                SessionState::AwaitingSecondFactor(identity.requires_two_factor_auth.clone());
            inner.identity = None;
        } else if identity.is_complete() {
            inner.state = SessionState::Authenticated(identity.clone());
            inner.identity = Some(identity.clone());
        } else {
            inner.state = SessionState::Unauthenticated;
            inner.identity = None;
        }
        Ok(identity)
    }

    /// Submit a one-time code for `method`.
    pub async fn verify_second_factor(
        &self,
        code: &str,
        method: &TwoFactorMethod,
    ) -> Result<(), AuthError> {
        if !method.is_supported() {
            return Err(AuthError::UnsupportedSecondFactor {
                method: method.to_string(),
            });
        }

        let reply = self
            .api
            .verify_second_factor(method, code.trim())
            .await
            .map_err(|e| AuthError::from_verify(method.as_str(), e))?;

        if !reply.value.verified {
            return Err(AuthError::InvalidSecondFactor {
                method: method.to_string(),
                message: "Code was not verified".to_string(),
            });
        }
        self.absorb_cookies(&reply.set_cookies).await;
        debug!("{} code verified", method);
        Ok(())
    }

    /// The signed-in identity, validating the session once if none is cached.
    pub async fn current_identity(&self) -> Option<Identity> {
        let cached = self.lock().identity.clone();
        if cached.is_some() {
            return cached;
        }
        if self.validate().await {
            self.lock().identity.clone()
        } else {
            None
        }
    }

    /// Full interactive sign-in.
    ///
    /// Reuses the saved session when it is still good. Otherwise logs in and
    /// answers each pending second factor, in upstream order, re-logging in
    /// after every accepted code until nothing is pending.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
        prompt: &dyn SecondFactorPrompt,
    ) -> Result<Identity, AuthError> {
        if self.try_load_session().await {
            if let Some(identity) = self.current_identity().await {
                info!("Session valid, signed in as {}", identity.display_name);
                self.lock().login = Some(RememberedLogin {
                    username: username.to_string(),
                    password: password.to_string(),
                });
                return Ok(identity);
            }
        }
        info!("Signing in as {}", username);

        let mut identity = self.login(username, password).await?;

        if identity.needs_second_factor() {
            let methods = identity.supported_methods();
            if methods.is_empty() {
                let method = identity
                    .requires_two_factor_auth
                    .first()
                    .map(ToString::to_string)
                    .unwrap_or_default();
                return Err(self.fail(AuthError::UnsupportedSecondFactor { method }));
            }

            for method in methods {
                info!("Second factor required: {}", method);
                let code = match prompt.code_for(&method).await {
                    Ok(code) => code,
                    Err(e) => return Err(self.fail(e)),
                };
                if let Err(e) = self.verify_second_factor(&code, &method).await {
                    return Err(self.fail(e));
                }
                identity = self.login(username, password).await?;
                if !identity.needs_second_factor() {
                    break;
                }
            }
        }

        if !identity.is_complete() {
            return Err(self.fail(AuthError::IncompleteIdentity));
        }
        info!("Signed in as {}", identity.display_name);
        Ok(identity)
    }

    /// Log in again with the remembered username and password.
    ///
    /// Returns `Ok(false)` when no login is remembered or the upstream now
    /// wants a second factor, both of which need a human.
    pub async fn reauthenticate(&self) -> Result<bool, AuthError> {
        let remembered = self.lock().login.clone();
        let Some(login) = remembered else {
            warn!("Session rejected and no login to retry with");
            return Ok(false);
        };

        info!("Session rejected, signing in again");
        let identity = self.login(&login.username, &login.password).await?;
        if identity.needs_second_factor() {
            warn!("Re-login needs a second factor; restart interactively");
            return Ok(false);
        }
        Ok(identity.is_complete())
    }

    /// Merge `Set-Cookie` values, reinstall the cookie header and persist.
    async fn absorb_cookies(&self, set_cookies: &[String]) {
        let tokens = {
            let mut inner = self.lock();
            if !inner.tokens.merge_set_cookies(set_cookies) {
                return;
            }
            inner.tokens.saved_at = Some(Utc::now());
            inner.tokens.clone()
        };

        self.api.set_session(&tokens);
        if let Err(e) = self.store.save(&tokens).await {
            warn!("Failed to persist session: {}", e);
        }
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{InMemoryCredentials, MockHttpClient, MockResponse, ScriptedPrompt};
    use crate::traits::Response;
    use serde_json::json;

    const BASE: &str = "https://api.test/api/1";

    fn url(path: &str) -> String {
        format!("{}{}", BASE, path)
    }

    fn manager(mock: &MockHttpClient, store: &InMemoryCredentials) -> SessionManager {
        let api = Arc::new(ApiClient::with_base_url(Arc::new(mock.clone()), BASE));
        SessionManager::new(api, Arc::new(store.clone()))
    }

    fn ok(body: serde_json::Value) -> MockResponse {
        MockResponse::Success(Response::json_body(200, &body))
    }

    fn me() -> serde_json::Value {
        json!({"id": "usr_me", "displayName": "Me"})
    }

    #[tokio::test]
    async fn test_try_load_without_record_makes_no_request() {
        let mock = MockHttpClient::new();
        let store = InMemoryCredentials::new();
        let session = manager(&mock, &store);

        assert!(!session.try_load_session().await);
        assert!(mock.get_requests().is_empty());
        assert_eq!(session.state(), SessionState::Unauthenticated);
    }

    #[tokio::test]
    async fn test_try_load_valid_session() {
        let mock = MockHttpClient::new();
        mock.set_response(&url("/auth/user"), ok(me()));
        let store = InMemoryCredentials::with_tokens(SessionTokens::from_pairs([("auth", "saved")]));
        let session = manager(&mock, &store);

        assert!(session.try_load_session().await);
        assert_eq!(
            mock.get_requests()[0].headers.get("Cookie").map(String::as_str),
            Some("auth=saved")
        );
        assert_eq!(session.current_identity().await.unwrap().display_name, "Me");
        assert!(matches!(session.state(), SessionState::Authenticated(_)));
    }

    #[tokio::test]
    async fn test_try_load_rejected_session_is_false_not_error() {
        let mock = MockHttpClient::new();
        mock.set_response(
            &url("/auth/user"),
            MockResponse::Success(Response::json_body(
                401,
                &json!({"error": {"message": "Missing Credentials", "status_code": 401}}),
            )),
        );
        let store = InMemoryCredentials::with_tokens(SessionTokens::from_pairs([("auth", "old")]));
        let session = manager(&mock, &store);

        assert!(!session.try_load_session().await);
        assert!(store.get_tokens().is_none());
        assert!(!session.api().has_session());
    }

    #[tokio::test]
    async fn test_try_load_network_failure_keeps_saved_session() {
        let mock = MockHttpClient::new();
        mock.set_response(
            &url("/auth/user"),
            MockResponse::Error(crate::traits::HttpError::Timeout("timed out".to_string())),
        );
        let store = InMemoryCredentials::with_tokens(SessionTokens::from_pairs([("auth", "kept")]));
        let session = manager(&mock, &store);

        assert!(!session.try_load_session().await);
        assert_eq!(store.get_tokens().unwrap().get("auth"), Some("kept"));
    }

    #[tokio::test]
    async fn test_try_load_store_failure_is_false() {
        let mock = MockHttpClient::new();
        let store = InMemoryCredentials::new();
        store.set_load_should_fail(true);
        let session = manager(&mock, &store);

        assert!(!session.try_load_session().await);
    }

    #[tokio::test]
    async fn test_login_persists_cookies() {
        let mock = MockHttpClient::new();
        mock.set_response(
            &url("/auth/user"),
            MockResponse::Success(
                Response::json_body(200, &json!({"requiresTwoFactorAuth": ["emailOtp"]}))
                    .with_set_cookies(["auth=fresh; Path=/; HttpOnly"]),
            ),
        );
        let store = InMemoryCredentials::new();
        let session = manager(&mock, &store);

        let identity = session.login("rae", "pw").await.unwrap();
        assert!(identity.needs_second_factor());
        assert_eq!(
            session.state(),
            SessionState::AwaitingSecondFactor(vec![TwoFactorMethod::EmailOtp])
        );
        assert_eq!(store.get_tokens().unwrap().get("auth"), Some("fresh"));
        assert!(session.api().has_session());
    }

    #[tokio::test]
    async fn test_login_rejected_sets_auth_failed() {
        let mock = MockHttpClient::new();
        mock.set_response(
            &url("/auth/user"),
            MockResponse::Success(Response::json_body(
                401,
                &json!({"error": {"message": "Invalid Username/Email or Password", "status_code": 401}}),
            )),
        );
        let session = manager(&mock, &InMemoryCredentials::new());

        let err = session.login("rae", "bad").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials { .. }));
        assert!(matches!(session.state(), SessionState::AuthFailed(_)));
    }

    #[tokio::test]
    async fn test_login_save_failure_is_not_fatal() {
        let mock = MockHttpClient::new();
        mock.set_response(
            &url("/auth/user"),
            MockResponse::Success(Response::json_body(200, &me()).with_set_cookies(["auth=a"])),
        );
        let store = InMemoryCredentials::new();
        store.set_save_should_fail(true);
        let session = manager(&mock, &store);

        assert!(session.login("rae", "pw").await.unwrap().is_complete());
    }

    #[tokio::test]
    async fn test_verify_false_is_invalid_second_factor() {
        let mock = MockHttpClient::new();
        mock.set_response(
            &url("/auth/twofactorauth/totp/verify"),
            MockResponse::Success(
                Response::json_body(200, &json!({"verified": false}))
                    .with_set_cookies(["twoFactorAuth=bogus; Path=/"]),
            ),
        );
        let store = InMemoryCredentials::new();
        let session = manager(&mock, &store);

        let err = session
            .verify_second_factor("000000", &TwoFactorMethod::Totp)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidSecondFactor { .. }));
        assert!(store.get_tokens().is_none());
        assert!(!session.api().has_session());
    }

    #[tokio::test]
    async fn test_verify_success_persists_cookie() {
        let mock = MockHttpClient::new();
        mock.set_response(
            &url("/auth/twofactorauth/totp/verify"),
            MockResponse::Success(
                Response::json_body(200, &json!({"verified": true}))
                    .with_set_cookies(["twoFactorAuth=good; Path=/"]),
            ),
        );
        let store = InMemoryCredentials::new();
        let session = manager(&mock, &store);

        session
            .verify_second_factor("123456", &TwoFactorMethod::Totp)
            .await
            .unwrap();
        assert_eq!(store.get_tokens().unwrap().get("twoFactorAuth"), Some("good"));
    }

    #[tokio::test]
    async fn test_verify_unsupported_method_rejected_locally() {
        let mock = MockHttpClient::new();
        let session = manager(&mock, &InMemoryCredentials::new());

        let err = session
            .verify_second_factor("1", &TwoFactorMethod::Other("otp".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UnsupportedSecondFactor { .. }));
        assert!(mock.get_requests().is_empty());
    }

    #[tokio::test]
    async fn test_authenticate_walks_methods_in_order() {
        let mock = MockHttpClient::new();
        let login = url("/auth/user");
        mock.push_response(&login, ok(json!({"requiresTwoFactorAuth": ["emailOtp", "totp"]})));
        mock.push_response(&login, ok(json!({"requiresTwoFactorAuth": ["totp"]})));
        mock.push_response(&login, ok(me()));
        mock.set_response(
            &url("/auth/twofactorauth/emailotp/verify"),
            ok(json!({"verified": true})),
        );
        mock.set_response(
            &url("/auth/twofactorauth/totp/verify"),
            ok(json!({"verified": true})),
        );
        let prompt = ScriptedPrompt::with_codes(["111111", "222222"]);
        let session = manager(&mock, &InMemoryCredentials::new());

        let identity = session.authenticate("rae", "pw", &prompt).await.unwrap();
        assert_eq!(identity.display_name, "Me");
        assert_eq!(prompt.asked(), vec![TwoFactorMethod::EmailOtp, TwoFactorMethod::Totp]);

        let calls: Vec<String> = mock
            .get_requests()
            .into_iter()
            .map(|r| r.url.trim_start_matches(BASE).to_string())
            .collect();
        assert_eq!(
            calls,
            vec![
                "/auth/user",
                "/auth/twofactorauth/emailotp/verify",
                "/auth/user",
                "/auth/twofactorauth/totp/verify",
                "/auth/user",
            ]
        );
    }

    #[tokio::test]
    async fn test_authenticate_stops_once_nothing_pending() {
        let mock = MockHttpClient::new();
        let login = url("/auth/user");
        mock.push_response(&login, ok(json!({"requiresTwoFactorAuth": ["emailOtp", "totp"]})));
        mock.push_response(&login, ok(me()));
        mock.set_response(
            &url("/auth/twofactorauth/emailotp/verify"),
            ok(json!({"verified": true})),
        );
        let prompt = ScriptedPrompt::with_codes(["111111"]);
        let session = manager(&mock, &InMemoryCredentials::new());

        session.authenticate("rae", "pw", &prompt).await.unwrap();
        assert_eq!(prompt.asked(), vec![TwoFactorMethod::EmailOtp]);
        assert_eq!(mock.request_count(&url("/auth/twofactorauth/totp/verify")), 0);
    }

    #[tokio::test]
    async fn test_authenticate_incomplete_identity() {
        let mock = MockHttpClient::new();
        mock.set_response(&url("/auth/user"), ok(json!({"id": "usr_me"})));
        let session = manager(&mock, &InMemoryCredentials::new());

        let err = session
            .authenticate("rae", "pw", &ScriptedPrompt::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::IncompleteIdentity));
        assert!(matches!(session.state(), SessionState::AuthFailed(_)));
    }

    #[tokio::test]
    async fn test_authenticate_only_unsupported_methods() {
        let mock = MockHttpClient::new();
        mock.set_response(&url("/auth/user"), ok(json!({"requiresTwoFactorAuth": ["otp"]})));
        let session = manager(&mock, &InMemoryCredentials::new());

        let err = session
            .authenticate("rae", "pw", &ScriptedPrompt::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UnsupportedSecondFactor { ref method } if method == "otp"));
    }

    #[tokio::test]
    async fn test_authenticate_reuses_saved_session() {
        let mock = MockHttpClient::new();
        mock.set_response(&url("/auth/user"), ok(me()));
        let store = InMemoryCredentials::with_tokens(SessionTokens::from_pairs([("auth", "saved")]));
        let session = manager(&mock, &store);

        session
            .authenticate("rae", "pw", &ScriptedPrompt::default())
            .await
            .unwrap();
        assert_eq!(mock.get_requests().len(), 1);
        assert!(!mock.get_requests()[0].headers.contains_key("Authorization"));
    }

    #[tokio::test]
    async fn test_reauthenticate_without_login_is_false() {
        let session = manager(&MockHttpClient::new(), &InMemoryCredentials::new());
        assert!(!session.reauthenticate().await.unwrap());
    }

    #[tokio::test]
    async fn test_reauthenticate_uses_remembered_login() {
        let mock = MockHttpClient::new();
        mock.set_response(&url("/auth/user"), ok(me()));
        let session = manager(&mock, &InMemoryCredentials::new());
        session.login("rae", "pw").await.unwrap();
        mock.clear_requests();

        assert!(session.reauthenticate().await.unwrap());
        assert!(mock.get_requests()[0].headers.contains_key("Authorization"));
    }
}
