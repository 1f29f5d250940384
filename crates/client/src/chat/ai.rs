//! Chat with the shopping assistant.
//!
//! The backend is the authority on replies: the user's message is inserted
//! optimistically, then either the assistant's answer or a synthetic error
//! message follows. Only one send may be in flight at a time.
//!
//! Sending is split into [`AiChatSession::begin_send`] and
//! [`AiChatSession::complete`] so the session never has to be borrowed across
//! the network call; [`AiChatSession::send`] runs both back to back.

use std::future::Future;

use thiserror::Error;
use tracing::{debug, warn};

use cinecart_core::{ChatMessage, SenderId};

use super::failure::{FailureKind, classify_failure};
use super::log::{ChatLog, Composer};
use crate::api::{AiReply, ApiClient, ApiError};

const GREETING: &str = "Hi! I'm your AI assistant. Ask me about your products or orders.";

/// Something that can answer a chat message.
pub trait AiBackend: Send + Sync {
    fn ask(&self, message: &str) -> impl Future<Output = Result<AiReply, ApiError>> + Send;
}

impl AiBackend for ApiClient {
    fn ask(&self, message: &str) -> impl Future<Output = Result<AiReply, ApiError>> + Send {
        self.ask_ai(message)
    }
}

/// Errors raised by the chat sessions themselves.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ChatError {
    /// A previous send has not completed yet.
    #[error("a message is already being sent")]
    SendInFlight,
}

/// Ticket for a send started with [`AiChatSession::begin_send`].
#[derive(Debug)]
#[must_use = "a pending send must be passed to `complete`"]
pub struct PendingSend {
    ticket: u64,
    text: String,
}

impl PendingSend {
    /// The trimmed text to send.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// What [`AiChatSession::complete`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The assistant's reply was inserted.
    Replied,
    /// A synthetic error message was inserted.
    Failed(FailureKind),
    /// The ticket no longer matches the in-flight send; nothing changed.
    Stale,
}

/// Assistant chat state for one screen.
#[derive(Debug)]
pub struct AiChatSession {
    own_id: SenderId,
    log: ChatLog,
    composer: Composer,
    in_flight: Option<u64>,
    next_ticket: u64,
}

impl Default for AiChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl AiChatSession {
    /// A session seeded with the assistant's greeting.
    #[must_use]
    pub fn new() -> Self {
        Self {
            own_id: SenderId::local_user(),
            log: greeting_log(),
            composer: Composer::new(),
            in_flight: None,
            next_ticket: 0,
        }
    }

    #[must_use]
    pub const fn log(&self) -> &ChatLog {
        &self.log
    }

    #[must_use]
    pub const fn composer(&self) -> &Composer {
        &self.composer
    }

    /// The composer stays editable while a send is in flight.
    pub fn composer_mut(&mut self) -> &mut Composer {
        &mut self.composer
    }

    #[must_use]
    pub const fn is_sending(&self) -> bool {
        self.in_flight.is_some()
    }

    #[must_use]
    pub fn is_own_message(&self, message: &ChatMessage) -> bool {
        message.sender_id == self.own_id
    }

    /// Start sending the composer's text.
    ///
    /// Returns `Ok(None)` without touching anything when the text is blank.
    /// Otherwise the message is inserted at the head of the log, the composer
    /// is cleared and a ticket for [`complete`](Self::complete) is returned.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::SendInFlight`] if a previous send is unfinished.
    pub fn begin_send(&mut self) -> Result<Option<PendingSend>, ChatError> {
        if self.in_flight.is_some() {
            return Err(ChatError::SendInFlight);
        }
        let Some(text) = self.composer.take_trimmed() else {
            return Ok(None);
        };
        let message = match ChatMessage::local(text.clone(), self.own_id.clone()) {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, "Refusing to insert local message");
                return Ok(None);
            }
        };
        self.log.prepend(message);

        let ticket = self.next_ticket;
        self.next_ticket = self.next_ticket.wrapping_add(1);
        self.in_flight = Some(ticket);
        debug!(ticket, "Send started");

        Ok(Some(PendingSend { ticket, text }))
    }

    /// Finish a send with the backend's result.
    pub fn complete(&mut self, pending: PendingSend, result: Result<AiReply, ApiError>) -> SendOutcome {
        if self.in_flight != Some(pending.ticket) {
            debug!(ticket = pending.ticket, "Ignoring stale completion");
            return SendOutcome::Stale;
        }
        self.in_flight = None;

        let failure = match result {
            Ok(AiReply { text: Some(text) }) if !text.trim().is_empty() => {
                self.insert_assistant_message(text);
                return SendOutcome::Replied;
            }
            Ok(_) => {
                warn!("Assistant reply had no text");
                FailureKind::Generic
            }
            Err(e) => {
                warn!(error = %e, "Assistant request failed");
                classify_failure(&e)
            }
        };
        self.insert_assistant_message(failure.user_message().into_owned());
        SendOutcome::Failed(failure)
    }

    /// Send the composer's text and wait for the reply.
    ///
    /// Returns `Ok(None)` if there was nothing to send.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::SendInFlight`] if a previous send is unfinished.
    pub async fn send<B: AiBackend>(&mut self, backend: &B) -> Result<Option<SendOutcome>, ChatError> {
        let Some(pending) = self.begin_send()? else {
            return Ok(None);
        };
        let result = backend.ask(pending.text()).await;
        Ok(Some(self.complete(pending, result)))
    }

    /// Back to just the greeting. Any in-flight send becomes stale.
    pub fn reset(&mut self) {
        self.log = greeting_log();
        self.composer = Composer::new();
        self.in_flight = None;
    }

    fn insert_assistant_message(&mut self, text: String) {
        match ChatMessage::local(text, SenderId::assistant()) {
            Ok(message) => self.log.prepend(message),
            Err(e) => warn!(error = %e, "Dropping assistant message"),
        }
    }
}

fn greeting_log() -> ChatLog {
    ChatMessage::local(GREETING, SenderId::assistant())
        .map(ChatLog::with_greeting)
        .unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    struct FixedBackend(Result<AiReply, ApiError>);

    impl AiBackend for FixedBackend {
        async fn ask(&self, _message: &str) -> Result<AiReply, ApiError> {
            self.0.clone()
        }
    }

    fn reply(text: &str) -> Result<AiReply, ApiError> {
        Ok(AiReply {
            text: Some(text.to_string()),
        })
    }

    #[test]
    fn test_new_session_has_greeting() {
        let session = AiChatSession::new();
        assert_eq!(session.log().len(), 1);
        let greeting = session.log().first().unwrap();
        assert!(!session.is_own_message(greeting));
    }

    #[test]
    fn test_begin_send_inserts_optimistically() {
        let mut session = AiChatSession::new();
        session.composer_mut().set_text("hi");

        let pending = session.begin_send().unwrap().unwrap();

        assert_eq!(pending.text(), "hi");
        let head = session.log().first().unwrap();
        assert_eq!(head.text, "hi");
        assert!(session.is_own_message(head));
        assert_eq!(session.composer().text(), "");
        assert!(session.is_sending());
        let _ = session.complete(pending, reply("ok"));
    }

    #[test]
    fn test_blank_send_is_noop() {
        let mut session = AiChatSession::new();
        session.composer_mut().set_text("   ");

        assert!(session.begin_send().unwrap().is_none());
        assert_eq!(session.log().len(), 1);
        assert_eq!(session.composer().text(), "   ");
        assert!(!session.is_sending());
    }

    #[test]
    fn test_second_send_rejected_while_in_flight() {
        let mut session = AiChatSession::new();
        session.composer_mut().set_text("first");
        let pending = session.begin_send().unwrap().unwrap();

        session.composer_mut().set_text("second");
        assert_eq!(session.begin_send().unwrap_err(), ChatError::SendInFlight);
        assert_eq!(session.composer().text(), "second");

        assert_eq!(session.complete(pending, reply("answer")), SendOutcome::Replied);
        assert!(session.begin_send().unwrap().is_some());
    }

    #[test]
    fn test_reply_is_prepended_as_assistant() {
        let mut session = AiChatSession::new();
        session.composer_mut().set_text("what's on?");
        let pending = session.begin_send().unwrap().unwrap();

        session.complete(pending, reply("Dune, 19:30"));

        let texts: Vec<_> = session.log().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, ["Dune, 19:30", "what's on?", GREETING]);
        assert_eq!(session.log().first().unwrap().sender_id, SenderId::assistant());
        assert!(!session.is_sending());
    }

    #[test]
    fn test_failure_inserts_single_synthetic_message() {
        let mut session = AiChatSession::new();
        session.composer_mut().set_text("hello");
        let pending = session.begin_send().unwrap().unwrap();

        let outcome = session.complete(pending, Err(ApiError::Unauthorized { status: 401 }));

        assert_eq!(outcome, SendOutcome::Failed(FailureKind::SessionExpired));
        assert_eq!(session.log().len(), 3);
        let head = session.log().first().unwrap();
        assert_eq!(head.text, FailureKind::SessionExpired.user_message());
        assert!(!session.is_own_message(head));
    }

    #[test]
    fn test_blank_reply_is_generic_failure() {
        let mut session = AiChatSession::new();
        session.composer_mut().set_text("hello");
        let pending = session.begin_send().unwrap().unwrap();

        let outcome = session.complete(pending, Ok(AiReply { text: None }));

        assert_eq!(outcome, SendOutcome::Failed(FailureKind::Generic));
        assert_eq!(
            session.log().first().unwrap().text,
            FailureKind::Generic.user_message()
        );
    }

    #[test]
    fn test_completion_after_reset_is_ignored() {
        let mut session = AiChatSession::new();
        session.composer_mut().set_text("hello");
        let pending = session.begin_send().unwrap().unwrap();

        session.reset();

        assert_eq!(session.complete(pending, reply("late")), SendOutcome::Stale);
        assert_eq!(session.log().len(), 1);
    }

    #[tokio::test]
    async fn test_send_with_backend() {
        let mut session = AiChatSession::new();
        let backend = FixedBackend(reply("Popcorn is 5.00"));

        session.composer_mut().set_text("price of popcorn?");
        let outcome = session.send(&backend).await.unwrap();

        assert_eq!(outcome, Some(SendOutcome::Replied));
        assert_eq!(session.log().first().unwrap().text, "Popcorn is 5.00");
    }

    #[tokio::test]
    async fn test_send_transport_failure() {
        let mut session = AiChatSession::new();
        let backend = FixedBackend(Err(ApiError::Transport("refused".into())));

        session.composer_mut().set_text("anyone there?");
        let outcome = session.send(&backend).await.unwrap();

        assert_eq!(outcome, Some(SendOutcome::Failed(FailureKind::Unreachable)));
        assert!(!session.is_sending());
    }
}
