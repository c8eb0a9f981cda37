//! Runtime configuration.
//!
//! Everything is read from environment variables once at startup and passed
//! down explicitly. Use the builder methods to override values in tests.
//!
//! | Variable | Meaning |
//! |----------|---------|
//! | `VRCHAT_USERNAME` / `VRCHAT_PASSWORD` | upstream login |
//! | `VRCWATCH_API_URL` | upstream base URL |
//! | `VRCWATCH_USERS_FILE` | tracked users JSON file |
//! | `VRCWATCH_SESSION_FILE` | session record path |
//! | `VRCWATCH_POLL_SECS` | seconds between cycles |
//! | `DISCORD_BOT_TOKEN` / `DISCORD_CHANNEL_ID` | notification channel |
//! | `DISCORD_MENTION_USER_ID` | who to ping on favorite alerts |

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::{DEFAULT_API_URL, DEFAULT_USER_AGENT};
use crate::auth::SessionStore;
use crate::error::ConfigError;
use crate::monitor::{DEFAULT_POLL_INTERVAL, DEFAULT_REPORT_INTERVAL};
use crate::presence::RetryPolicy;

/// Default location of the tracked users file.
pub const DEFAULT_USERS_FILE: &str = "config/users.json";

/// Prefix every tracked user id must carry.
const USER_ID_PREFIX: &str = "usr_";

/// Monitor configuration.
///
/// # Example
///
/// ```ignore
/// use vrcwatch::config::WatchConfig;
///
/// let config = WatchConfig::default()
///     .with_users_path("users.json")
///     .with_poll_interval(Duration::from_secs(60));
/// ```
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Upstream API base URL
    pub api_base_url: String,
    /// User-Agent sent with every upstream request
    pub user_agent: String,
    /// Tracked users file
    pub users_path: PathBuf,
    /// Session record path (default: `~/.vrcwatch/session.json`)
    pub session_path: Option<PathBuf>,
    /// Time between polling cycles
    pub poll_interval: Duration,
    /// Quiet period after which an unchanged report is sent anyway
    pub report_interval: Duration,
    /// Per-user retry and pacing
    pub retry: RetryPolicy,
    /// Discord bot token
    pub discord_token: Option<String>,
    /// Discord channel to post into
    pub discord_channel_id: Option<String>,
    /// Discord user mentioned in favorite alerts
    pub mention_user_id: Option<String>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            users_path: PathBuf::from(DEFAULT_USERS_FILE),
            session_path: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            report_interval: DEFAULT_REPORT_INTERVAL,
            retry: RetryPolicy::default(),
            discord_token: None,
            discord_channel_id: None,
            mention_user_id: None,
        }
    }
}

impl WatchConfig {
    /// Create a new WatchConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the upstream base URL.
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Set the tracked users file.
    pub fn with_users_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.users_path = path.into();
        self
    }

    /// Set the session record path.
    pub fn with_session_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_path = Some(path.into());
        self
    }

    /// Set the time between cycles.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set the Discord bot token and channel.
    pub fn with_discord(mut self, token: impl Into<String>, channel_id: impl Into<String>) -> Self {
        self.discord_token = Some(token.into());
        self.discord_channel_id = Some(channel_id.into());
        self
    }

    /// Set the user mentioned in favorite alerts.
    pub fn with_mention_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.mention_user_id = Some(user_id.into());
        self
    }

    /// Build config from the environment. Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(url) = env_var("VRCWATCH_API_URL") {
            config.api_base_url = url;
        }
        if let Some(path) = env_var("VRCWATCH_USERS_FILE") {
            config.users_path = PathBuf::from(path);
        }
        if let Some(path) = env_var("VRCWATCH_SESSION_FILE") {
            config.session_path = Some(PathBuf::from(path));
        }
        if let Some(raw) = env_var("VRCWATCH_POLL_SECS") {
            config.poll_interval = parse_secs("VRCWATCH_POLL_SECS", &raw)?;
        }
        config.discord_token = env_var("DISCORD_BOT_TOKEN");
        config.discord_channel_id = env_var("DISCORD_CHANNEL_ID");
        config.mention_user_id = env_var("DISCORD_MENTION_USER_ID");

        Ok(config)
    }

    /// Discord token and channel, when both are configured.
    pub fn discord(&self) -> Option<(&str, &str)> {
        match (&self.discord_token, &self.discord_channel_id) {
            (Some(token), Some(channel)) => Some((token.as_str(), channel.as_str())),
            _ => None,
        }
    }

    /// The session store at the configured or default path.
    pub fn session_store(&self) -> Result<SessionStore, ConfigError> {
        match &self.session_path {
            Some(path) => Ok(SessionStore::with_path(path)),
            None => SessionStore::new().ok_or(ConfigError::NoHomeDirectory),
        }
    }
}

/// Upstream username and password.
#[derive(Clone)]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
}

impl LoginCredentials {
    /// Read `VRCHAT_USERNAME` and `VRCHAT_PASSWORD`, asking on the terminal
    /// for a missing password.
    pub fn from_env() -> Result<Self, ConfigError> {
        let username = env_var("VRCHAT_USERNAME")
            .ok_or_else(|| ConfigError::MissingVar("VRCHAT_USERNAME".to_string()))?;

        let password = match env_var("VRCHAT_PASSWORD") {
            Some(password) => password,
            None => rpassword::prompt_password(format!("VRChat password for {}: ", username))
                .map_err(|e| ConfigError::InvalidVar {
                    variable: "VRCHAT_PASSWORD".to_string(),
                    message: e.to_string(),
                })?,
        };
        if password.is_empty() {
            return Err(ConfigError::MissingVar("VRCHAT_PASSWORD".to_string()));
        }

        Ok(Self { username, password })
    }
}

impl std::fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// The users to watch, fixed for the life of the process.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackedUsers {
    /// User ids to poll, in file order
    pub users: Vec<String>,
    /// Subset that triggers "came online" alerts
    pub favorites: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct UsersFile {
    #[serde(default)]
    users: Vec<String>,
    #[serde(default)]
    favorites: Vec<String>,
}

impl TrackedUsers {
    /// Read and parse the users file.
    ///
    /// Ids that do not start with `usr_` are dropped from `users`.
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file: UsersFile = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self {
            users: file
                .users
                .into_iter()
                .filter(|id| id.starts_with(USER_ID_PREFIX))
                .collect(),
            favorites: file.favorites,
        })
    }

    /// Like [`TrackedUsers::read`], but a missing or broken file logs an
    /// error and yields an empty list.
    pub fn load(path: &Path) -> Self {
        match Self::read(path) {
            Ok(users) => users,
            Err(e) => {
                tracing::error!("Error loading user config: {}", e);
                Self::default()
            }
        }
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_secs(variable: &str, raw: &str) -> Result<Duration, ConfigError> {
    match raw.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidVar {
            variable: variable.to_string(),
            message: format!("expected a positive number of seconds, got '{}'", raw),
        }),
    }
}
