//! Authentication-related error types.
//!
//! These errors come out of the interactive login flow. They are never
//! retried internally: each one needs new input from a human.

use std::fmt;

use crate::api::ApiError;

/// Authentication-specific error variants.
#[derive(Debug, Clone)]
pub enum AuthError {
    /// Username/password rejected.
    InvalidCredentials { message: String },

    /// The one-time code was rejected.
    InvalidSecondFactor { method: String, message: String },

    /// The upstream asked for a method this client cannot verify.
    UnsupportedSecondFactor { method: String },

    /// Login "succeeded" but no usable identity came back.
    IncompleteIdentity,

    /// Reading a one-time code from the user failed.
    PromptFailed { message: String },

    /// Transport or server failure during an authentication request.
    Upstream(ApiError),
}

impl AuthError {
    /// Map a failed login request: 401/403 means bad credentials, anything
    /// else is an upstream failure.
    pub fn from_login(err: ApiError) -> Self {
        match err.status() {
            Some(401) | Some(403) => AuthError::InvalidCredentials {
                message: err.diagnostic(),
            },
            _ => AuthError::Upstream(err),
        }
    }

    /// Map a failed verify request: any 4xx means the code was rejected.
    pub fn from_verify(method: &str, err: ApiError) -> Self {
        match err.status() {
            Some(status) if (400..500).contains(&status) && status != 429 => {
                AuthError::InvalidSecondFactor {
                    method: method.to_string(),
                    message: err.diagnostic(),
                }
            }
            _ => AuthError::Upstream(err),
        }
    }

    /// Whether the caller must ask the human for different input.
    pub fn needs_new_input(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidCredentials { .. }
                | AuthError::InvalidSecondFactor { .. }
                | AuthError::UnsupportedSecondFactor { .. }
        )
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::InvalidCredentials { .. } => {
                "VRChat rejected the username or password. Check VRCHAT_USERNAME and VRCHAT_PASSWORD."
                    .to_string()
            }
            AuthError::InvalidSecondFactor { method, .. } => {
                format!("The {} code was not accepted. Please try again.", method)
            }
            AuthError::UnsupportedSecondFactor { method } => format!(
                "VRChat asked for '{}' verification, which is not supported. Use an email or authenticator code.",
                method
            ),
            AuthError::IncompleteIdentity => {
                "Signed in, but VRChat did not return account details.".to_string()
            }
            AuthError::PromptFailed { .. } => "Could not read the verification code.".to_string(),
            AuthError::Upstream(err) => format!("Could not reach VRChat: {}", err),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials { .. } => "AUTH_INVALID_CREDENTIALS",
            AuthError::InvalidSecondFactor { .. } => "AUTH_INVALID_2FA",
            AuthError::UnsupportedSecondFactor { .. } => "AUTH_UNSUPPORTED_2FA",
            AuthError::IncompleteIdentity => "AUTH_INCOMPLETE_IDENTITY",
            AuthError::PromptFailed { .. } => "AUTH_PROMPT_FAILED",
            AuthError::Upstream(_) => "AUTH_UPSTREAM",
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidCredentials { message } => {
                write!(f, "Invalid credentials: {}", message)
            }
            AuthError::InvalidSecondFactor { method, message } => {
                write!(f, "Invalid {} code: {}", method, message)
            }
            AuthError::UnsupportedSecondFactor { method } => {
                write!(f, "Unsupported second factor method: {}", method)
            }
            AuthError::IncompleteIdentity => {
                write!(f, "Authentication succeeded but user data is incomplete")
            }
            AuthError::PromptFailed { message } => write!(f, "Prompt failed: {}", message),
            AuthError::Upstream(err) => write!(f, "Authentication request failed: {}", err),
        }
    }
}

impl std::error::Error for AuthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AuthError::Upstream(err) => Some(err),
            _ => None,
        }
    }
}
