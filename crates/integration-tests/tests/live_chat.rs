//! Two clients on the live chat socket.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use futures::StreamExt;

use cinecart_client::chat::{LiveChatSession, LiveSendOutcome, Received};
use cinecart_client::live::{LiveChannel, OutboundMessage, WebSocketChannel, pump};
use cinecart_core::SenderId;
use cinecart_integration_tests::FakeBackend;

#[tokio::test]
async fn test_message_reaches_other_client_only() {
    let backend = FakeBackend::start().await.unwrap();
    let url = backend.config().unwrap().live_chat_url;

    let (ana_channel, mut ana_incoming) = WebSocketChannel::connect(&url).await.unwrap();
    let (bea_channel, mut bea_incoming) = WebSocketChannel::connect(&url).await.unwrap();
    assert!(backend.wait_for_live_clients(2).await);

    let mut ana = LiveChatSession::new(ana_channel, "Ana");
    let mut bea = LiveChatSession::new(bea_channel, "Bea");

    ana.composer_mut().set_text("anyone for Dune tonight?");
    assert_eq!(ana.send(), LiveSendOutcome::Sent);
    assert_eq!(ana.log().len(), 1);

    let payload = tokio::time::timeout(Duration::from_secs(2), bea_incoming.next())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(bea.on_remote_message(payload), Received::Inserted);

    let received = bea.log().first().unwrap();
    assert_eq!(received.text, "anyone for Dune tonight?");
    assert_eq!(received.sender_id, *ana.own_id());
    assert_eq!(received.sender_name.as_deref(), Some("Ana"));
    assert!(!bea.is_own_message(received));

    // The sender gets nothing back.
    let echo = tokio::time::timeout(Duration::from_millis(200), ana_incoming.next()).await;
    assert!(echo.is_err());
    assert_eq!(ana.log().len(), 1);
}

#[tokio::test]
async fn test_pump_drops_invalid_payloads() {
    let backend = FakeBackend::start().await.unwrap();
    let url = backend.config().unwrap().live_chat_url;

    let (sender, _sender_incoming) = WebSocketChannel::connect(&url).await.unwrap();
    let (receiver, receiver_incoming) = WebSocketChannel::connect(&url).await.unwrap();
    assert!(backend.wait_for_live_clients(2).await);

    let peer = SenderId::new("user-peer");
    for text in ["", "first", "   ", "second"] {
        sender
            .emit(&OutboundMessage {
                text: text.to_string(),
                sender_id: peer.clone(),
                sender_name: "Peer".to_string(),
            })
            .unwrap();
    }

    let mut session = LiveChatSession::new(receiver, "Me");
    let incoming = receiver_incoming.take(4);
    let inserted = tokio::time::timeout(Duration::from_secs(2), pump(&mut session, incoming))
        .await
        .unwrap();

    assert_eq!(inserted, 2);
    let texts: Vec<_> = session.log().iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, ["second", "first"]);
}
