//! The authenticated account as reported by `GET /auth/user`.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// A second-factor method the upstream may ask for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TwoFactorMethod {
    /// One-time code sent by email.
    EmailOtp,
    /// Time-based one-time password from an authenticator app.
    Totp,
    /// Anything else (recovery codes, future methods). Cannot be verified here.
    Other(String),
}

impl TwoFactorMethod {
    /// Wire name used by the upstream API.
    pub fn as_str(&self) -> &str {
        match self {
            TwoFactorMethod::EmailOtp => "emailOtp",
            TwoFactorMethod::Totp => "totp",
            TwoFactorMethod::Other(name) => name,
        }
    }

    /// Verification endpoint path, if this client can verify the method.
    pub fn verify_path(&self) -> Option<&'static str> {
        match self {
            TwoFactorMethod::EmailOtp => Some("/auth/twofactorauth/emailotp/verify"),
            TwoFactorMethod::Totp => Some("/auth/twofactorauth/totp/verify"),
            TwoFactorMethod::Other(_) => None,
        }
    }

    /// Whether the method can be verified by this client.
    pub fn is_supported(&self) -> bool {
        self.verify_path().is_some()
    }
}

impl FromStr for TwoFactorMethod {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "emailOtp" => TwoFactorMethod::EmailOtp,
            "totp" => TwoFactorMethod::Totp,
            other => TwoFactorMethod::Other(other.to_string()),
        })
    }
}

impl fmt::Display for TwoFactorMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TwoFactorMethod {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TwoFactorMethod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.parse().unwrap_or(TwoFactorMethod::Other(raw)))
    }
}

/// The account the session belongs to.
///
/// When a second factor is still required, the upstream returns only
/// `requiresTwoFactorAuth` and both `id` and `display_name` are empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub requires_two_factor_auth: Vec<TwoFactorMethod>,
}

impl Identity {
    /// True while the upstream still asks for a second factor.
    pub fn needs_second_factor(&self) -> bool {
        !self.requires_two_factor_auth.is_empty()
    }

    /// Pending methods this client is able to verify, in upstream order.
    pub fn supported_methods(&self) -> Vec<TwoFactorMethod> {
        self.requires_two_factor_auth
            .iter()
            .filter(|m| m.is_supported())
            .cloned()
            .collect()
    }

    /// Fully authenticated: no pending factor and a display name present.
    pub fn is_complete(&self) -> bool {
        !self.needs_second_factor() && !self.display_name.is_empty()
    }
}
