use thiserror::Error;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Authentication expired{}", detail(.0))]
    AuthenticationExpired(Option<String>),

    #[error("Access denied{}", detail(.0))]
    AuthorizationDenied(Option<String>),

    #[error("Resource not found{}", detail(.0))]
    NotFound(Option<String>),

    #[error("Server error ({status}){}", detail(.message))]
    ServerFault { status: u16, message: Option<String> },

    #[error("Network error: {0}")]
    NetworkUnreachable(#[from] reqwest::Error),

    #[error("Malformed request: {0}")]
    RequestMalformed(String),

    #[error("Request rejected{}", detail(.0))]
    ValidationFailed(Option<String>),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

fn detail(message: &Option<String>) -> String {
    match message {
        Some(m) => format!(": {}", m),
        None => String::new(),
    }
}

/// Maximum length for error response bodies in log output
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    pub(crate) fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Pull the human-readable `message` field out of a JSON error body.
    pub(crate) fn body_message(body: &str) -> Option<String> {
        serde_json::from_str::<serde_json::Value>(body)
            .ok()?
            .get("message")?
            .as_str()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = Self::body_message(body);
        match status.as_u16() {
            401 => ApiError::AuthenticationExpired(message),
            403 => ApiError::AuthorizationDenied(message),
            404 => ApiError::NotFound(message),
            code @ 500..=599 => ApiError::ServerFault { status: code, message },
            _ => ApiError::ValidationFailed(message),
        }
    }

    /// The server-supplied message, if the failure carried one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::AuthenticationExpired(m)
            | ApiError::AuthorizationDenied(m)
            | ApiError::NotFound(m)
            | ApiError::ValidationFailed(m)
            | ApiError::ServerFault { message: m, .. } => m.as_deref(),
            _ => None,
        }
    }

    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::AuthenticationExpired(_))
    }
}

/// Message to show for a failed operation.
///
/// The server's own message wins; otherwise the operation's fixed default.
pub fn extract_message(error: &ApiError, default: &str) -> String {
    error
        .server_message()
        .map(str::to_string)
        .unwrap_or_else(|| default.to_string())
}
