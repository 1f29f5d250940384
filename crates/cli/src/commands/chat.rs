//! Interactive chat commands. One line of input is one message.

use futures::StreamExt;
use tokio::io::{AsyncBufReadExt, BufReader};

use cinecart_client::chat::{Composer, LiveSendOutcome, Received, SendOutcome};
use cinecart_client::live::WebSocketChannel;
use cinecart_client::{AiChatSession, AuthSession, ClientConfig, LiveChatSession};
use cinecart_core::ChatMessage;

#[allow(clippy::print_stdout)]
fn print_message(message: &ChatMessage, own: bool) {
    let who = if own {
        "you"
    } else {
        message
            .sender_name
            .as_deref()
            .unwrap_or_else(|| message.sender_id.as_str())
    };
    println!("[{}] {who}: {}", message.timestamp.format("%H:%M"), message.text);
}

/// Add a typed line to the draft, after any text kept from a failed send.
fn stage_line(composer: &mut Composer, line: &str) {
    if composer.is_blank() {
        composer.set_text(line);
    } else {
        composer.push_str("\n");
        composer.push_str(line);
    }
}

/// Chat with the assistant until stdin closes.
///
/// # Errors
///
/// Returns an error if stdin fails or the session expires.
pub async fn ai(session: &AuthSession) -> Result<(), Box<dyn std::error::Error>> {
    let mut chat = AiChatSession::new();
    if let Some(greeting) = chat.log().first() {
        print_message(greeting, false);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        chat.composer_mut().set_text(line);
        let Some(outcome) = chat.send(session.api()).await? else {
            continue;
        };
        if let Some(reply) = chat.log().first() {
            print_message(reply, false);
        }
        if matches!(&outcome, SendOutcome::Failed(kind) if kind.is_session_expired()) {
            session.logout().await;
            return Err("session expired".into());
        }
    }
    Ok(())
}

/// Join the live chat until stdin closes or the server disconnects.
///
/// # Errors
///
/// Returns an error if the connection cannot be made or stdin fails.
#[allow(clippy::print_stdout)]
pub async fn live(config: &ClientConfig) -> Result<(), Box<dyn std::error::Error>> {
    let (channel, mut incoming) = WebSocketChannel::connect(&config.live_chat_url).await?;
    let mut chat = LiveChatSession::new(channel, config.user_name.clone());
    println!("Connected as {} ({}).", config.user_name, chat.own_id());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                stage_line(chat.composer_mut(), &line);
                match chat.send() {
                    LiveSendOutcome::Sent | LiveSendOutcome::Empty => {}
                    LiveSendOutcome::NotConnected => {
                        println!("Not connected; message kept and sent with your next line.");
                    }
                    LiveSendOutcome::Failed(e) => {
                        if let Some(message) = chat.log().first() {
                            print_message(message, false);
                        }
                        tracing::warn!(error = %e, "Message not sent");
                    }
                }
            }
            payload = incoming.next() => {
                let Some(payload) = payload else {
                    println!("Disconnected.");
                    break;
                };
                if chat.on_remote_message(payload) == Received::Inserted {
                    if let Some(message) = chat.log().first() {
                        print_message(message, chat.is_own_message(message));
                    }
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_line_replaces_blank_draft() {
        let mut composer = Composer::new();
        stage_line(&mut composer, "hello");
        assert_eq!(composer.text(), "hello");
    }

    #[test]
    fn test_stage_line_keeps_unsent_draft() {
        let mut composer = Composer::new();
        stage_line(&mut composer, "first");
        stage_line(&mut composer, "second");
        assert_eq!(composer.text(), "first\nsecond");
    }
}
