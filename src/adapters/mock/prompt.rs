//! Scripted second-factor prompt for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::auth::identity::TwoFactorMethod;
use crate::error::AuthError;
use crate::traits::SecondFactorPrompt;

/// Replays queued codes and records which methods were asked for.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompt {
    codes: Arc<Mutex<VecDeque<String>>>,
    asked: Arc<Mutex<Vec<TwoFactorMethod>>>,
}

impl ScriptedPrompt {
    /// Create a prompt that answers with `codes`, in order.
    pub fn with_codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            codes: Arc::new(Mutex::new(codes.into_iter().map(Into::into).collect())),
            asked: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Methods asked for so far, in order.
    pub fn asked(&self) -> Vec<TwoFactorMethod> {
        self.asked.lock().unwrap().clone()
    }
}

#[async_trait]
impl SecondFactorPrompt for ScriptedPrompt {
    async fn code_for(&self, method: &TwoFactorMethod) -> Result<String, AuthError> {
        self.asked.lock().unwrap().push(method.clone());
        self.codes
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AuthError::PromptFailed {
                message: format!("no scripted code left for {}", method),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replays_codes_in_order() {
        let prompt = ScriptedPrompt::with_codes(["111111", "222222"]);
        assert_eq!(prompt.code_for(&TwoFactorMethod::EmailOtp).await.unwrap(), "111111");
        assert_eq!(prompt.code_for(&TwoFactorMethod::Totp).await.unwrap(), "222222");
        assert!(prompt.code_for(&TwoFactorMethod::Totp).await.is_err());
        assert_eq!(
            prompt.asked(),
            vec![
                TwoFactorMethod::EmailOtp,
                TwoFactorMethod::Totp,
                TwoFactorMethod::Totp
            ]
        );
    }
}
