//! Chat sessions.
//!
//! Both variants keep a [`ChatLog`] ordered newest first and a [`Composer`].
//! Every message entering a log, whether typed locally, pushed by the channel
//! or fabricated to report an error, goes through the same validation step in
//! `cinecart_core`.

mod ai;
mod failure;
mod live;
mod log;

pub use ai::{AiBackend, AiChatSession, ChatError, PendingSend, SendOutcome};
pub use failure::{FailureKind, classify_failure};
pub use live::{LiveChatSession, LiveSendOutcome, Received};
pub use log::{ChatLog, Composer};
