//! Live chat transport.
//!
//! Every frame on the wire is a JSON envelope naming the event:
//!
//! ```json
//! {"event": "liveChatMessage", "data": {"text": "...", "senderId": "...", "senderName": "..."}}
//! ```

mod websocket;

pub use websocket::{Incoming, WebSocketChannel};

use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use cinecart_core::SenderId;

use crate::chat::{LiveChatSession, Received};

/// Event name for chat messages in both directions.
pub const LIVE_CHAT_EVENT: &str = "liveChatMessage";

/// Errors raised by a live channel.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LiveError {
    #[error("failed to connect: {0}")]
    Connect(String),

    #[error("channel is closed")]
    Closed,

    #[error("failed to encode message: {0}")]
    Encode(String),
}

/// A message this client sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundMessage {
    pub text: String,
    pub sender_id: SenderId,
    pub sender_name: String,
}

/// Wire envelope around every live chat frame.
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub event: String,
    pub data: T,
}

impl<T> Envelope<T> {
    /// Wrap `data` as a chat message event.
    pub fn chat(data: T) -> Self {
        Self {
            event: LIVE_CHAT_EVENT.to_string(),
            data,
        }
    }
}

/// A bidirectional message channel.
pub trait LiveChannel {
    /// Whether the channel can currently send.
    fn is_connected(&self) -> bool;

    /// Queue `message` for sending. Does not wait for delivery.
    ///
    /// `Ok` means the message was queued, not that the peer received it. A
    /// transport failure after that is only logged; it marks the channel
    /// disconnected so later sends report it.
    ///
    /// # Errors
    ///
    /// Returns [`LiveError`] if the channel is closed or the message cannot
    /// be encoded.
    fn emit(&self, message: &OutboundMessage) -> Result<(), LiveError>;
}

/// Feed every payload from `incoming` into `session` until the stream ends.
///
/// Returns how many messages were inserted into the log.
pub async fn pump<C, S>(session: &mut LiveChatSession<C>, mut incoming: S) -> usize
where
    C: LiveChannel,
    S: Stream<Item = serde_json::Value> + Unpin,
{
    let mut inserted = 0;
    while let Some(payload) = incoming.next().await {
        if session.on_remote_message(payload) == Received::Inserted {
            inserted += 1;
        }
    }
    debug!(inserted, "Live chat stream ended");
    inserted
}
