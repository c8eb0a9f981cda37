//! File-based credentials provider adapter.
//!
//! This module provides a credentials provider implementation that uses
//! [`SessionStore`] for file-based storage.

use async_trait::async_trait;
use std::path::Path;

use crate::auth::store::{SessionStore, SessionTokens};
use crate::traits::{CredentialsError, CredentialsProvider};

/// File-based credentials provider.
///
/// This adapter wraps [`SessionStore`] and implements the
/// [`CredentialsProvider`] trait.
///
/// The session is stored in `~/.vrcwatch/session.json` unless another path is
/// given.
///
/// # Example
///
/// ```ignore
/// use vrcwatch::adapters::FileCredentialsProvider;
/// use vrcwatch::traits::CredentialsProvider;
///
/// let provider = FileCredentialsProvider::new()?;
///
/// if let Some(tokens) = provider.load().await? {
///     println!("Found {} saved cookies", tokens.cookies.len());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FileCredentialsProvider {
    store: SessionStore,
}

impl FileCredentialsProvider {
    /// Create a provider at the default location.
    ///
    /// # Returns
    /// The provider, or an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, CredentialsError> {
        SessionStore::new()
            .map(Self::with_store)
            .ok_or_else(|| {
                CredentialsError::Other("Failed to determine home directory".to_string())
            })
    }

    /// Create a provider backed by an explicit store.
    pub fn with_store(store: SessionStore) -> Self {
        Self { store }
    }

    /// Get the path to the session file.
    pub fn session_path(&self) -> &Path {
        self.store.path()
    }
}

#[async_trait]
impl CredentialsProvider for FileCredentialsProvider {
    async fn load(&self) -> Result<Option<SessionTokens>, CredentialsError> {
        // SessionStore::load() returns an empty record if the file doesn't exist
        let tokens = self.store.load();
        if tokens.is_empty() {
            Ok(None)
        } else {
            Ok(Some(tokens))
        }
    }

    async fn save(&self, tokens: &SessionTokens) -> Result<(), CredentialsError> {
        self.store
            .save(tokens)
            .map_err(|e| CredentialsError::SaveFailed(e.to_string()))
    }

    async fn clear(&self) -> Result<(), CredentialsError> {
        self.store
            .clear()
            .map_err(|e| CredentialsError::ClearFailed(e.to_string()))
    }
}
