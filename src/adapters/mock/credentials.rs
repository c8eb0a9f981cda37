//! In-memory session store for testing.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::auth::store::SessionTokens;
use crate::traits::{CredentialsError, CredentialsProvider};

/// In-memory session store for testing.
///
/// Clones share the same storage, so a test can keep a handle and inspect
/// what the session manager persisted.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentials {
    /// Stored record
    tokens: Arc<Mutex<Option<SessionTokens>>>,
    /// Whether save should fail
    save_should_fail: Arc<Mutex<bool>>,
    /// Whether load should fail
    load_should_fail: Arc<Mutex<bool>>,
    /// Number of successful saves
    save_count: Arc<Mutex<usize>>,
}

impl InMemoryCredentials {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding an initial record.
    pub fn with_tokens(tokens: SessionTokens) -> Self {
        let store = Self::default();
        store.set_tokens(Some(tokens));
        store
    }

    /// Configure whether save should fail.
    pub fn set_save_should_fail(&self, should_fail: bool) {
        *self.save_should_fail.lock().unwrap() = should_fail;
    }

    /// Configure whether load should fail.
    pub fn set_load_should_fail(&self, should_fail: bool) {
        *self.load_should_fail.lock().unwrap() = should_fail;
    }

    /// Current record, read synchronously.
    pub fn get_tokens(&self) -> Option<SessionTokens> {
        self.tokens.lock().unwrap().clone()
    }

    /// Replace the record synchronously.
    pub fn set_tokens(&self, tokens: Option<SessionTokens>) {
        *self.tokens.lock().unwrap() = tokens;
    }

    /// How many times `save` succeeded.
    pub fn save_count(&self) -> usize {
        *self.save_count.lock().unwrap()
    }
}

#[async_trait]
impl CredentialsProvider for InMemoryCredentials {
    async fn load(&self) -> Result<Option<SessionTokens>, CredentialsError> {
        if *self.load_should_fail.lock().unwrap() {
            return Err(CredentialsError::LoadFailed("Mock load failure".to_string()));
        }
        Ok(self.get_tokens().filter(|t| !t.is_empty()))
    }

    async fn save(&self, tokens: &SessionTokens) -> Result<(), CredentialsError> {
        if *self.save_should_fail.lock().unwrap() {
            return Err(CredentialsError::SaveFailed("Mock save failure".to_string()));
        }
        self.set_tokens(Some(tokens.clone()));
        *self.save_count.lock().unwrap() += 1;
        Ok(())
    }

    async fn clear(&self) -> Result<(), CredentialsError> {
        self.set_tokens(None);
        Ok(())
    }
}
