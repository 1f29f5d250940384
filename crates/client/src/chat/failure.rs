//! Turning a failed send into something the user can read.

use std::borrow::Cow;

use crate::api::ApiError;

const SESSION_EXPIRED: &str = "Your session has expired. Please log in again.";
const SERVER_FALLBACK: &str = "Try again.";
const UNREACHABLE: &str = "Could not connect to the chat server.";
const GENERIC: &str = "Sorry, I couldn't process your message right now.";

/// How a failed chat send is presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// 401/403, or no token at all. The caller should force a logout.
    SessionExpired,
    /// The backend answered with an error; carries its message if any.
    Server(Option<String>),
    /// No response was received.
    Unreachable,
    /// Anything else, including a reply without text.
    Generic,
}

impl FailureKind {
    /// Text for the synthetic message inserted into the log.
    #[must_use]
    pub fn user_message(&self) -> Cow<'static, str> {
        match self {
            Self::SessionExpired => Cow::Borrowed(SESSION_EXPIRED),
            Self::Server(message) => Cow::Owned(format!(
                "Server error: {}",
                message.as_deref().unwrap_or(SERVER_FALLBACK)
            )),
            Self::Unreachable => Cow::Borrowed(UNREACHABLE),
            Self::Generic => Cow::Borrowed(GENERIC),
        }
    }

    #[must_use]
    pub const fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired)
    }
}

/// Classify an API error for display.
#[must_use]
pub fn classify_failure(error: &ApiError) -> FailureKind {
    match error {
        ApiError::MissingToken | ApiError::Unauthorized { .. } => FailureKind::SessionExpired,
        ApiError::Conflict(message)
        | ApiError::Validation(message)
        | ApiError::Server { message, .. } => FailureKind::Server(message.clone()),
        ApiError::Transport(_) => FailureKind::Unreachable,
        ApiError::Parse(_) | ApiError::Configuration(_) => FailureKind::Generic,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_failure() {
        assert_eq!(
            classify_failure(&ApiError::Unauthorized { status: 403 }),
            FailureKind::SessionExpired
        );
        assert_eq!(
            classify_failure(&ApiError::MissingToken),
            FailureKind::SessionExpired
        );
        assert_eq!(
            classify_failure(&ApiError::Transport("connection refused".into())),
            FailureKind::Unreachable
        );
        assert_eq!(
            classify_failure(&ApiError::Parse("eof".into())),
            FailureKind::Generic
        );
        assert_eq!(
            classify_failure(&ApiError::Server {
                status: 500,
                message: Some("model offline".into())
            }),
            FailureKind::Server(Some("model offline".into()))
        );
    }

    #[test]
    fn test_user_message_uses_server_text_verbatim() {
        assert_eq!(
            FailureKind::Server(Some("model offline".into())).user_message(),
            "Server error: model offline"
        );
        assert_eq!(
            FailureKind::Server(None).user_message(),
            "Server error: Try again."
        );
        assert_eq!(
            FailureKind::Unreachable.user_message(),
            "Could not connect to the chat server."
        );
    }
}
