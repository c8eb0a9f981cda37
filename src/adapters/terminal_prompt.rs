//! Second-factor prompt on the controlling terminal.

use async_trait::async_trait;
use std::io::{self, BufRead, Write};

use crate::auth::TwoFactorMethod;
use crate::error::AuthError;
use crate::traits::SecondFactorPrompt;

/// Reads one-time codes from stdin.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompt;

impl TerminalPrompt {
    fn label(method: &TwoFactorMethod) -> String {
        match method {
            TwoFactorMethod::EmailOtp => "email".to_string(),
            TwoFactorMethod::Totp => "authenticator".to_string(),
            TwoFactorMethod::Other(name) => name.clone(),
        }
    }
}

#[async_trait]
impl SecondFactorPrompt for TerminalPrompt {
    async fn code_for(&self, method: &TwoFactorMethod) -> Result<String, AuthError> {
        let question = format!("Enter the {} code: ", Self::label(method));

        let line = tokio::task::spawn_blocking(move || -> io::Result<String> {
            let mut stdout = io::stdout();
            write!(stdout, "{}", question)?;
            stdout.flush()?;

            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;
            Ok(line)
        })
        .await
        .map_err(|e| AuthError::PromptFailed {
            message: e.to_string(),
        })?
        .map_err(|e| AuthError::PromptFailed {
            message: e.to_string(),
        })?;

        let code = line.trim().to_string();
        if code.is_empty() {
            return Err(AuthError::PromptFailed {
                message: "no code entered".to_string(),
            });
        }
        Ok(code)
    }
}
