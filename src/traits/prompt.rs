//! Second-factor prompt trait abstraction.
//!
//! Interactive authentication needs a human to type a one-time code. The
//! session manager asks for it through this trait so the flow can be driven
//! by a terminal in production and by a script in tests.

use async_trait::async_trait;

use crate::auth::identity::TwoFactorMethod;
use crate::error::AuthError;

/// Source of one-time codes for second-factor verification.
#[async_trait]
pub trait SecondFactorPrompt: Send + Sync {
    /// Ask for a code for `method`.
    async fn code_for(&self, method: &TwoFactorMethod) -> Result<String, AuthError>;
}
