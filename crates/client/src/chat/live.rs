//! Live chat between shoppers.
//!
//! Sends are fire-and-forget over an open channel. The server does not echo a
//! sender's own message back, so the optimistic copy is the only one; if it
//! does arrive anyway it is recognised by sender id and skipped.

use tracing::{debug, warn};

use cinecart_core::{ChatMessage, MessageRejected, SenderId, parse_message};

use super::failure::FailureKind;
use super::log::{ChatLog, Composer};
use crate::live::{LiveChannel, LiveError, OutboundMessage};

/// What [`LiveChatSession::send`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveSendOutcome {
    /// The message was inserted and handed to the channel.
    Sent,
    /// Nothing to send; the composer is untouched.
    Empty,
    /// The channel is down; the composer is untouched.
    NotConnected,
    /// The channel refused the message; a synthetic error was inserted.
    Failed(LiveError),
}

/// What [`LiveChatSession::on_remote_message`] did with a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Received {
    Inserted,
    /// Our own message coming back; already in the log.
    Echo,
    Dropped(MessageRejected),
}

/// Live chat state for one screen.
#[derive(Debug)]
pub struct LiveChatSession<C> {
    channel: C,
    own_id: SenderId,
    own_name: String,
    log: ChatLog,
    composer: Composer,
}

impl<C: LiveChannel> LiveChatSession<C> {
    /// Start a session with a fresh random identity.
    pub fn new(channel: C, user_name: impl Into<String>) -> Self {
        Self::with_identity(channel, SenderId::random_user(), user_name)
    }

    pub fn with_identity(channel: C, own_id: SenderId, user_name: impl Into<String>) -> Self {
        Self {
            channel,
            own_id,
            own_name: user_name.into(),
            log: ChatLog::new(),
            composer: Composer::new(),
        }
    }

    #[must_use]
    pub const fn own_id(&self) -> &SenderId {
        &self.own_id
    }

    #[must_use]
    pub const fn channel(&self) -> &C {
        &self.channel
    }

    #[must_use]
    pub const fn log(&self) -> &ChatLog {
        &self.log
    }

    #[must_use]
    pub const fn composer(&self) -> &Composer {
        &self.composer
    }

    pub fn composer_mut(&mut self) -> &mut Composer {
        &mut self.composer
    }

    #[must_use]
    pub fn is_own_message(&self, message: &ChatMessage) -> bool {
        message.sender_id == self.own_id
    }

    /// Send the composer's text.
    pub fn send(&mut self) -> LiveSendOutcome {
        if self.composer.is_blank() {
            return LiveSendOutcome::Empty;
        }
        if !self.channel.is_connected() {
            debug!("Not connected, keeping draft");
            return LiveSendOutcome::NotConnected;
        }
        let Some(text) = self.composer.take_trimmed() else {
            return LiveSendOutcome::Empty;
        };

        match ChatMessage::local(text.clone(), self.own_id.clone()) {
            Ok(message) => self.log.prepend(message.with_sender_name(self.own_name.clone())),
            Err(e) => {
                warn!(error = %e, "Refusing to insert local message");
                return LiveSendOutcome::Empty;
            }
        }

        let outbound = OutboundMessage {
            text,
            sender_id: self.own_id.clone(),
            sender_name: self.own_name.clone(),
        };
        match self.channel.emit(&outbound) {
            Ok(()) => LiveSendOutcome::Sent,
            Err(e) => {
                warn!(error = %e, "Live chat emit failed");
                self.insert_failure(&FailureKind::Unreachable);
                LiveSendOutcome::Failed(e)
            }
        }
    }

    /// Validate a pushed payload and insert it.
    pub fn on_remote_message(&mut self, payload: serde_json::Value) -> Received {
        let message = match parse_message(payload) {
            Ok(message) => message,
            Err(rejected) => {
                debug!(reason = %rejected, "Dropping invalid live message");
                return Received::Dropped(rejected);
            }
        };
        if self.is_own_message(&message) {
            return Received::Echo;
        }
        self.log.prepend(message);
        Received::Inserted
    }

    fn insert_failure(&mut self, kind: &FailureKind) {
        match ChatMessage::local(kind.user_message(), SenderId::assistant()) {
            Ok(message) => self.log.prepend(message),
            Err(e) => warn!(error = %e, "Dropping error message"),
        }
    }
}
