//! Chat message types.
//!
//! Two shapes exist on the wire: the live-chat server sends `senderId`, while
//! locally echoed and older payloads use `sender`. [`IncomingMessage`] accepts
//! both and [`IncomingMessage::validate`] is the single place that turns raw
//! input into a canonical [`ChatMessage`]. Nothing reaches a chat log without
//! going through it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{MessageId, SenderId, deserialize_flexible_opt};

/// Why an incoming payload was refused.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRejected {
    /// The payload has no `text`, or the text is blank.
    #[error("message has no text")]
    MissingText,
    /// The payload is not a JSON object of the expected shape.
    #[error("message payload is malformed")]
    Malformed,
}

/// A validated chat message.
///
/// `text` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Unique message ID.
    pub id: MessageId,
    /// Message body.
    pub text: String,
    /// Who wrote it.
    pub sender_id: SenderId,
    /// Optional display name of the author.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
    /// When the message was created.
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Build a locally authored message stamped with a fresh ID and the
    /// current time.
    ///
    /// # Errors
    ///
    /// Returns [`MessageRejected::MissingText`] if `text` is blank.
    pub fn local(text: impl Into<String>, sender_id: SenderId) -> Result<Self, MessageRejected> {
        IncomingMessage {
            text: Some(text.into()),
            sender_id: Some(sender_id.into_inner()),
            ..IncomingMessage::default()
        }
        .validate()
    }

    /// Attach a display name.
    #[must_use]
    pub fn with_sender_name(mut self, name: impl Into<String>) -> Self {
        self.sender_name = Some(name.into());
        self
    }
}

/// A chat payload as it arrives from a channel, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingMessage {
    /// Message ID; string or number. Generated when missing.
    #[serde(default, deserialize_with = "deserialize_flexible_opt")]
    pub id: Option<String>,
    /// Message body.
    #[serde(default)]
    pub text: Option<String>,
    /// Current sender field.
    #[serde(default)]
    pub sender_id: Option<String>,
    /// Legacy sender field.
    #[serde(default)]
    pub sender: Option<String>,
    /// Optional display name.
    #[serde(default)]
    pub sender_name: Option<String>,
    /// Creation time. Defaults to now when missing.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl IncomingMessage {
    /// Decode a raw JSON payload.
    ///
    /// # Errors
    ///
    /// Returns [`MessageRejected::Malformed`] if the value is not an object
    /// with compatible field types.
    pub fn from_json(value: serde_json::Value) -> Result<Self, MessageRejected> {
        serde_json::from_value(value).map_err(|_| MessageRejected::Malformed)
    }

    /// Normalize both legacy shapes into a canonical [`ChatMessage`].
    ///
    /// # Errors
    ///
    /// Returns [`MessageRejected::MissingText`] if the text is missing or
    /// blank. A payload naming no sender is attributed to
    /// [`SenderId::unknown`].
    pub fn validate(self) -> Result<ChatMessage, MessageRejected> {
        let text = self
            .text
            .filter(|t| !t.trim().is_empty())
            .ok_or(MessageRejected::MissingText)?;

        let sender_id = self
            .sender_id
            .or(self.sender)
            .filter(|s| !s.is_empty())
            .map_or_else(SenderId::unknown, SenderId::new);

        Ok(ChatMessage {
            id: self.id.map_or_else(MessageId::generate, MessageId::new),
            text,
            sender_id,
            sender_name: self.sender_name,
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
        })
    }
}

/// Decode and validate a raw JSON payload in one step.
///
/// # Errors
///
/// See [`IncomingMessage::from_json`] and [`IncomingMessage::validate`].
pub fn parse_message(value: serde_json::Value) -> Result<ChatMessage, MessageRejected> {
    IncomingMessage::from_json(value)?.validate()
}
