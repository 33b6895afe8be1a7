//! Unified client error handling for Bazar.
//!
//! Every failure a caller can observe is a [`ClientError`]. Non-success HTTP
//! responses are classified by [`ErrorCode`] so screens can pick the right
//! presentation (redirect to login, denial view, inline message, toast).

use reqwest::StatusCode;
use serde::Deserialize;
use std::path::PathBuf;

/// Classification of a failed call, independent of how it is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// 401 that survived the refresh path; the session is gone
    SessionEnded,
    /// 403 or a local role gate; the session is still valid
    Forbidden,
    /// 400 / 422 rejected by backend validation
    Validation,
    /// 404 on a single-resource lookup
    NotFound,
    /// Any other non-success status or a `success: false` envelope
    Api,
    /// Connection refused, DNS failure, timeout, TLS
    Network,
    /// The body could not be read as the expected envelope
    Decode,
    /// Local session persistence failed
    Storage,
    /// The access token could not be decoded
    Token,
    /// Local configuration is unusable
    Config,
}

impl ErrorCode {
    /// Map a response status to its error code.
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => ErrorCode::SessionEnded,
            StatusCode::FORBIDDEN => ErrorCode::Forbidden,
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ErrorCode::Validation,
            StatusCode::NOT_FOUND => ErrorCode::NotFound,
            _ => ErrorCode::Api,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::SessionEnded => "session_ended",
            ErrorCode::Forbidden => "forbidden",
            ErrorCode::Validation => "validation_error",
            ErrorCode::NotFound => "not_found",
            ErrorCode::Api => "api_error",
            ErrorCode::Network => "network_error",
            ErrorCode::Decode => "decode_error",
            ErrorCode::Storage => "storage_error",
            ErrorCode::Token => "token_error",
            ErrorCode::Config => "config_error",
        }
    }
}

/// Error type returned by every client operation.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("session ended, please log in again")]
    SessionEnded,

    #[error("unauthorized: {message}")]
    Forbidden { message: String },

    #[error("{message}")]
    Validation { message: String },

    #[error("not found: {message}")]
    NotFound { message: String },

    #[error("API error {status}: {message}")]
    Api { status: StatusCode, message: String },

    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("network error: {0}")]
    Network(String),

    #[error("failed to decode {context}: {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("session storage error at {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid access token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// Build the error for a non-success response from its status and body.
    pub fn from_response(status: StatusCode, body: &[u8]) -> Self {
        let message = error_message(body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });

        match ErrorCode::from_status(status) {
            ErrorCode::SessionEnded => ClientError::SessionEnded,
            ErrorCode::Forbidden => ClientError::Forbidden { message },
            ErrorCode::Validation => ClientError::Validation { message },
            ErrorCode::NotFound => ClientError::NotFound { message },
            _ => ClientError::Api { status, message },
        }
    }

    /// Local role gate failure.
    pub fn forbidden(message: impl Into<String>) -> Self {
        ClientError::Forbidden {
            message: message.into(),
        }
    }

    pub fn decode(context: impl Into<String>, source: serde_json::Error) -> Self {
        ClientError::Decode {
            context: context.into(),
            source,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ClientError::SessionEnded => ErrorCode::SessionEnded,
            ClientError::Forbidden { .. } => ErrorCode::Forbidden,
            ClientError::Validation { .. } => ErrorCode::Validation,
            ClientError::NotFound { .. } => ErrorCode::NotFound,
            ClientError::Api { .. } => ErrorCode::Api,
            ClientError::Transport(_) | ClientError::Network(_) => ErrorCode::Network,
            ClientError::Decode { .. } => ErrorCode::Decode,
            ClientError::Storage { .. } => ErrorCode::Storage,
            ClientError::Token(_) => ErrorCode::Token,
            ClientError::Config(_) => ErrorCode::Config,
        }
    }

    /// True when the caller must treat the user as logged out.
    pub fn is_session_ended(&self) -> bool {
        matches!(self, ClientError::SessionEnded)
    }

    /// Message suitable for showing to the user.
    ///
    /// Validation messages are passed through verbatim; transport failures
    /// collapse into a generic line.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Transport(_) | ClientError::Network(_) => {
                "Something went wrong, please try again".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Error body emitted by the backend.
///
/// `errorMessages` carries per-field validation failures on 400 responses.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error_messages: Vec<FieldMessage>,
}

#[derive(Debug, Deserialize)]
struct FieldMessage {
    #[serde(default)]
    path: String,
    message: String,
}

fn error_message(body: &[u8]) -> Option<String> {
    if let Ok(parsed) = serde_json::from_slice::<ErrorBody>(body) {
        if !parsed.error_messages.is_empty() {
            let joined = parsed
                .error_messages
                .iter()
                .map(|m| {
                    if m.path.is_empty() {
                        m.message.clone()
                    } else {
                        format!("{}: {}", m.path, m.message)
                    }
                })
                .collect::<Vec<_>>()
                .join("; ");
            return Some(joined);
        }
        return parsed.message.filter(|m| !m.trim().is_empty());
    }

    let text = String::from_utf8_lossy(body).trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
