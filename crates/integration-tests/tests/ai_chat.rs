//! Assistant chat against the fake backend.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use cinecart_client::chat::{AiChatSession, FailureKind, SendOutcome};
use cinecart_client::{ApiClient, MemoryTokenStore};
use cinecart_integration_tests::{AiMode, FakeBackend, TOKEN};

fn api(backend: &FakeBackend) -> ApiClient {
    ApiClient::new(
        &backend.config().unwrap(),
        Arc::new(MemoryTokenStore::with_token(TOKEN)),
    )
    .unwrap()
}

async fn ask(session: &mut AiChatSession, api: &ApiClient, text: &str) -> SendOutcome {
    session.composer_mut().set_text(text);
    session.send(api).await.unwrap().unwrap()
}

#[tokio::test]
async fn test_reply_follows_optimistic_message() {
    let backend = FakeBackend::start().await.unwrap();
    let api = api(&backend);
    let mut session = AiChatSession::new();

    let outcome = ask(&mut session, &api, "  what's playing?  ").await;

    assert_eq!(outcome, SendOutcome::Replied);
    let log: Vec<_> = session.log().iter().collect();
    assert_eq!(log.len(), 3);
    assert_eq!(log[0].text, "You said: what's playing?");
    assert!(!session.is_own_message(log[0]));
    assert_eq!(log[1].text, "what's playing?");
    assert!(session.is_own_message(log[1]));
}

#[tokio::test]
async fn test_server_error_message_is_shown() {
    let backend = FakeBackend::start().await.unwrap();
    backend.set_ai_mode(AiMode::Error);
    let api = api(&backend);
    let mut session = AiChatSession::new();

    let outcome = ask(&mut session, &api, "hello").await;

    assert_eq!(
        outcome,
        SendOutcome::Failed(FailureKind::Server(Some("model offline".to_string())))
    );
    assert_eq!(session.log().first().unwrap().text, "Server error: model offline");
    assert!(!session.is_sending());
}

#[tokio::test]
async fn test_reply_without_text_is_failure() {
    let backend = FakeBackend::start().await.unwrap();
    backend.set_ai_mode(AiMode::Empty);
    let api = api(&backend);
    let mut session = AiChatSession::new();

    assert_eq!(
        ask(&mut session, &api, "hello").await,
        SendOutcome::Failed(FailureKind::Generic)
    );
}

#[tokio::test]
async fn test_logged_out_send_reports_session_expired() {
    let backend = FakeBackend::start().await.unwrap();
    let api = ApiClient::new(&backend.config().unwrap(), Arc::new(MemoryTokenStore::new())).unwrap();
    let mut session = AiChatSession::new();

    assert_eq!(
        ask(&mut session, &api, "hello").await,
        SendOutcome::Failed(FailureKind::SessionExpired)
    );
}

#[tokio::test]
async fn test_configured_timeout_reports_unreachable() {
    let backend = FakeBackend::start().await.unwrap();
    backend.set_ai_mode(AiMode::Slow);
    let mut config = backend.config().unwrap();
    config.http_timeout = Some(Duration::from_millis(200));
    let api = ApiClient::new(&config, Arc::new(MemoryTokenStore::with_token(TOKEN))).unwrap();
    let mut session = AiChatSession::new();

    assert_eq!(
        ask(&mut session, &api, "hello").await,
        SendOutcome::Failed(FailureKind::Unreachable)
    );
}

#[tokio::test]
async fn test_begin_send_rejects_while_request_in_flight() {
    let backend = FakeBackend::start().await.unwrap();
    let api = api(&backend);
    let mut session = AiChatSession::new();

    session.composer_mut().set_text("first");
    let pending = session.begin_send().unwrap().unwrap();
    let request = {
        let api = api.clone();
        let text = pending.text().to_string();
        tokio::spawn(async move { api.ask_ai(&text).await })
    };

    session.composer_mut().set_text("second");
    assert!(session.begin_send().is_err());
    assert_eq!(session.composer().text(), "second");

    let result = request.await.unwrap();
    assert_eq!(session.complete(pending, result), SendOutcome::Replied);
    assert_eq!(session.log().first().unwrap().text, "You said: first");
}
