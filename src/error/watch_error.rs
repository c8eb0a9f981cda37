//! Unified error type for vrcwatch.
//!
//! Only authentication and configuration failures are fatal to a caller.
//! Polling, place-name and sink failures are absorbed where they happen and
//! never reach this type.

use std::fmt;

use super::auth::AuthError;
use super::config::ConfigError;
use crate::api::ApiError;
use crate::traits::CredentialsError;

/// Unified error type.
#[derive(Debug)]
pub enum WatchError {
    /// Authentication failed and needs a human.
    Auth(AuthError),

    /// An upstream call failed outside the polling path.
    Api(ApiError),

    /// Configuration could not be loaded.
    Config(ConfigError),

    /// The session store failed.
    Credentials(CredentialsError),
}

impl WatchError {
    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            WatchError::Auth(err) => err.user_message(),
            WatchError::Api(err) => format!("VRChat request failed: {}", err),
            WatchError::Config(err) => format!("Configuration problem: {}", err),
            WatchError::Credentials(err) => format!("Session storage problem: {}", err),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            WatchError::Auth(err) => err.error_code(),
            WatchError::Api(_) => "API_ERROR",
            WatchError::Config(_) => "CONFIG_ERROR",
            WatchError::Credentials(_) => "SESSION_STORE_ERROR",
        }
    }
}

impl fmt::Display for WatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WatchError::Auth(err) => write!(f, "{}", err),
            WatchError::Api(err) => write!(f, "{}", err),
            WatchError::Config(err) => write!(f, "{}", err),
            WatchError::Credentials(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for WatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WatchError::Auth(err) => Some(err),
            WatchError::Api(err) => Some(err),
            WatchError::Config(err) => Some(err),
            WatchError::Credentials(err) => Some(err),
        }
    }
}

impl From<AuthError> for WatchError {
    fn from(err: AuthError) -> Self {
        WatchError::Auth(err)
    }
}

impl From<ApiError> for WatchError {
    fn from(err: ApiError) -> Self {
        WatchError::Api(err)
    }
}

impl From<ConfigError> for WatchError {
    fn from(err: ConfigError) -> Self {
        WatchError::Config(err)
    }
}

impl From<CredentialsError> for WatchError {
    fn from(err: CredentialsError) -> Self {
        WatchError::Credentials(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        let err: WatchError = AuthError::IncompleteIdentity.into();
        assert!(matches!(err, WatchError::Auth(_)));
        assert_eq!(err.error_code(), "AUTH_INCOMPLETE_IDENTITY");

        let err: WatchError = ConfigError::MissingVar("VRCHAT_USERNAME".to_string()).into();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
        assert!(err.user_message().contains("VRCHAT_USERNAME"));

        let err: WatchError = CredentialsError::SaveFailed("ro".to_string()).into();
        assert_eq!(err.error_code(), "SESSION_STORE_ERROR");
    }

    #[test]
    fn test_source_chain() {
        use std::error::Error;
        let err: WatchError = ApiError::Decode("eof".to_string()).into();
        assert!(err.source().is_some());
    }
}
