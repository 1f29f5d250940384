//! Error types for the backend API client.

use thiserror::Error;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// No bearer token is stored for this session.
    #[error("not logged in")]
    MissingToken,

    /// The backend refused the token (401/403).
    #[error("unauthorized ({status})")]
    Unauthorized {
        /// HTTP status code.
        status: u16,
    },

    /// The resource already exists (409).
    #[error("conflict: {}", .0.as_deref().unwrap_or("already exists"))]
    Conflict(Option<String>),

    /// The backend rejected the request body (400).
    #[error("validation failed: {}", .0.as_deref().unwrap_or("invalid request"))]
    Validation(Option<String>),

    /// Any other non-success status.
    #[error("server error ({status}): {}", .message.as_deref().unwrap_or("no details"))]
    Server {
        /// HTTP status code.
        status: u16,
        /// `message` field of the error body, when the backend sent one.
        message: Option<String>,
    },

    /// The request never got a response (connect failure, reset, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body could not be decoded.
    #[error("parse error: {0}")]
    Parse(String),

    /// The client could not be built or an endpoint URL is invalid.
    #[error("client configuration error: {0}")]
    Configuration(String),
}

impl ApiError {
    /// Whether this error means the session is no longer valid and the caller
    /// should force a logout.
    #[must_use]
    pub const fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Unauthorized { .. } | Self::MissingToken)
    }

    /// The server-supplied message, if the backend sent one.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Conflict(message) | Self::Validation(message) | Self::Server { message, .. } => {
                message.as_deref()
            }
            _ => None,
        }
    }

    /// Map a non-success HTTP status and optional body message to an error.
    #[must_use]
    pub fn from_status(status: u16, message: Option<String>) -> Self {
        match status {
            401 | 403 => Self::Unauthorized { status },
            409 => Self::Conflict(message),
            400 => Self::Validation(message),
            _ => Self::Server { status, message },
        }
    }
}

/// Error body returned by the backend (`{"message": "..."}`).
#[derive(Debug, serde::Deserialize)]
pub struct ApiErrorBody {
    /// Human-readable message.
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_mapping() {
        assert_eq!(
            ApiError::from_status(401, None),
            ApiError::Unauthorized { status: 401 }
        );
        assert_eq!(
            ApiError::from_status(403, Some("forbidden".into())),
            ApiError::Unauthorized { status: 403 }
        );
        assert_eq!(
            ApiError::from_status(409, None),
            ApiError::Conflict(None)
        );
        assert_eq!(
            ApiError::from_status(400, Some("cpf".into())),
            ApiError::Validation(Some("cpf".into()))
        );
        assert_eq!(
            ApiError::from_status(502, None),
            ApiError::Server {
                status: 502,
                message: None
            }
        );
    }

    #[test]
    fn test_auth_failure() {
        assert!(ApiError::MissingToken.is_auth_failure());
        assert!(ApiError::Unauthorized { status: 403 }.is_auth_failure());
        assert!(!ApiError::Transport("refused".into()).is_auth_failure());
    }

    #[test]
    fn test_server_message() {
        let err = ApiError::from_status(500, Some("db down".into()));
        assert_eq!(err.server_message(), Some("db down"));
        assert_eq!(ApiError::Parse("x".into()).server_message(), None);
    }

    #[test]
    fn test_display() {
        let err = ApiError::Server {
            status: 500,
            message: Some("boom".into()),
        };
        assert_eq!(err.to_string(), "server error (500): boom");
        assert_eq!(
            ApiError::Conflict(None).to_string(),
            "conflict: already exists"
        );
    }

    #[test]
    fn test_error_body_deserialization() {
        let body: ApiErrorBody = serde_json::from_str(r#"{"message":"Email em uso"}"#).unwrap();
        assert_eq!(body.message.as_deref(), Some("Email em uso"));

        let empty: ApiErrorBody = serde_json::from_str("{}").unwrap();
        assert!(empty.message.is_none());
    }
}
