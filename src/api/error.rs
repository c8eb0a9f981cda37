//! Errors from the upstream presence API.

use std::fmt;

use serde::Deserialize;

use crate::traits::{HttpError, Response};

/// Error type for [`ApiClient`](super::ApiClient) operations.
#[derive(Debug, Clone)]
pub enum ApiError {
    /// The request never produced a response.
    Http(HttpError),
    /// The server answered with a non-2xx status.
    Status { status: u16, message: String },
    /// The body could not be decoded.
    Decode(String),
}

/// `{"error": {"message": "...", "status_code": 401}}`
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

impl ApiError {
    /// Build a status error from a non-2xx response, preferring the
    /// upstream's own error message.
    pub fn from_response(response: &Response) -> Self {
        let message = response
            .json::<ErrorEnvelope>()
            .ok()
            .and_then(|env| env.error.message)
            .or_else(|| response.text().ok().filter(|t| !t.trim().is_empty()))
            .unwrap_or_else(|| "Unknown error".to_string());
        ApiError::Status {
            status: response.status,
            message,
        }
    }

    /// HTTP status, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The session was rejected.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// The upstream asked us to slow down.
    pub fn is_rate_limited(&self) -> bool {
        self.status() == Some(429)
    }

    /// Short text suitable for a placeholder snapshot.
    pub fn diagnostic(&self) -> String {
        match self {
            ApiError::Status { message, .. } => message.clone(),
            ApiError::Http(e) => e.to_string(),
            ApiError::Decode(msg) => format!("Invalid response: {}", msg),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Http(e) => write!(f, "{}", e),
            ApiError::Status { status, message } => {
                write!(f, "Server error ({}): {}", status, message)
            }
            ApiError::Decode(msg) => write!(f, "Invalid response format: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<HttpError> for ApiError {
    fn from(e: HttpError) -> Self {
        ApiError::Http(e)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode(e.to_string())
    }
}
