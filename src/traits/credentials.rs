//! Session store trait abstraction.
//!
//! The session record is a single set of upstream cookies. This trait lets the
//! session manager persist it without knowing where it lives.

use async_trait::async_trait;

use crate::auth::store::SessionTokens;

/// Credential store operation errors.
#[derive(Debug, Clone)]
pub enum CredentialsError {
    /// Failed to load the session record
    LoadFailed(String),
    /// Failed to save the session record
    SaveFailed(String),
    /// Failed to clear the session record
    ClearFailed(String),
    /// Other error
    Other(String),
}

impl std::fmt::Display for CredentialsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialsError::LoadFailed(msg) => write!(f, "Failed to load session: {}", msg),
            CredentialsError::SaveFailed(msg) => write!(f, "Failed to save session: {}", msg),
            CredentialsError::ClearFailed(msg) => write!(f, "Failed to clear session: {}", msg),
            CredentialsError::Other(msg) => write!(f, "Session store error: {}", msg),
        }
    }
}

impl std::error::Error for CredentialsError {}

/// Trait for session record storage and retrieval.
///
/// Exactly one record exists per process. `save` overwrites it wholesale.
#[async_trait]
pub trait CredentialsProvider: Send + Sync {
    /// Load the session record.
    ///
    /// # Returns
    /// - `Ok(Some(tokens))` if a non-empty record exists
    /// - `Ok(None)` if nothing is stored
    /// - `Err(error)` if loading failed
    async fn load(&self) -> Result<Option<SessionTokens>, CredentialsError>;

    /// Overwrite the stored record.
    async fn save(&self, tokens: &SessionTokens) -> Result<(), CredentialsError>;

    /// Remove the stored record.
    async fn clear(&self) -> Result<(), CredentialsError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_error_display() {
        assert_eq!(
            CredentialsError::LoadFailed("read error".to_string()).to_string(),
            "Failed to load session: read error"
        );
        assert_eq!(
            CredentialsError::SaveFailed("disk full".to_string()).to_string(),
            "Failed to save session: disk full"
        );
        assert_eq!(
            CredentialsError::ClearFailed("busy".to_string()).to_string(),
            "Failed to clear session: busy"
        );
        assert_eq!(
            CredentialsError::Other("unknown".to_string()).to_string(),
            "Session store error: unknown"
        );
    }

    #[test]
    fn test_credentials_error_implements_error_trait() {
        let err = CredentialsError::Other("x".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
