use reqwest::StatusCode;
use thiserror::Error;

use crate::models::Envelope;

/// Server error code that asks the client to offer a forced re-login.
pub const ACCESS_DENIED_CODE: &str = "ACCESS_DENIED";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{message}")]
    Application {
        message: String,
        error_code: Option<String>,
    },

    #[error("Session expired - please log in again")]
    SessionExpired,

    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Request failed ({status}): {message}")]
    Request { status: u16, message: String },

    #[error("Request timed out - please try again later")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Failed to fetch current user: {0}")]
    IdentityFetch(#[source] Box<ApiError>),

    #[error("Credential storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
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

    /// Classify a non-success HTTP status. A 401 only arrives here for
    /// requests sent without a token; authenticated 401s go through
    /// refresh-and-retry instead.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let server_message = Envelope::message_from(body);
        match status.as_u16() {
            403 => ApiError::Forbidden(
                server_message.unwrap_or_else(|| "Insufficient permissions".to_string()),
            ),
            404 => ApiError::NotFound(
                server_message.unwrap_or_else(|| "The requested resource does not exist".to_string()),
            ),
            code @ 500..=599 => ApiError::Server {
                status: code,
                message: server_message.unwrap_or_else(|| "Internal server error".to_string()),
            },
            code => ApiError::Request {
                status: code,
                message: server_message.unwrap_or_else(|| {
                    if body.trim().is_empty() {
                        format!("Request failed ({})", code)
                    } else {
                        Self::truncate_body(body.trim())
                    }
                }),
            },
        }
    }

    /// Classify a transport-level failure where no usable response arrived
    pub fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else {
            ApiError::Network(err.to_string())
        }
    }

    /// Build the error for an envelope whose `success` flag is false
    pub fn from_envelope(envelope: &Envelope) -> Self {
        ApiError::Application {
            message: envelope
                .message
                .clone()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| "Request failed".to_string()),
            error_code: envelope.error_code.clone(),
        }
    }

    pub fn is_access_denied(&self) -> bool {
        matches!(
            self,
            ApiError::Application { error_code: Some(code), .. } if code == ACCESS_DENIED_CODE
        )
    }

    /// Text shown to the user when this error is reported
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Application { message, .. } => message.clone(),
            ApiError::SessionExpired => "Your session has expired, please log in again".to_string(),
            ApiError::Forbidden(message) => message.clone(),
            ApiError::NotFound(_) => "The requested resource does not exist".to_string(),
            ApiError::Server { message, .. } => message.clone(),
            ApiError::Request { message, .. } => message.clone(),
            ApiError::Timeout => "Request timed out, please try again later".to_string(),
            ApiError::Network(_) => "Network error, please check your connection".to_string(),
            other => other.to_string(),
        }
    }
}
