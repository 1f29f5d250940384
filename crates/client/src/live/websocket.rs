//! [`LiveChannel`] over a WebSocket.
//!
//! One writer task drains an unbounded queue into the socket so `emit` never
//! waits. One reader task forwards chat payloads to [`Incoming`]. Both are
//! aborted when the channel is dropped.

use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll};

use futures::{SinkExt, Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::{Envelope, LIVE_CHAT_EVENT, LiveChannel, LiveError, OutboundMessage};

/// A connected live chat socket.
pub struct WebSocketChannel {
    outbound: mpsc::UnboundedSender<String>,
    connected: Arc<AtomicBool>,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

/// Chat payloads received from the socket, in arrival order.
#[derive(Debug)]
pub struct Incoming {
    receiver: mpsc::UnboundedReceiver<serde_json::Value>,
}

impl Stream for Incoming {
    type Item = serde_json::Value;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

impl std::fmt::Debug for WebSocketChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebSocketChannel")
            .field("connected", &self.is_connected())
            .finish_non_exhaustive()
    }
}

impl WebSocketChannel {
    /// Connect to `url`.
    ///
    /// # Errors
    ///
    /// Returns `LiveError::Connect` if the handshake fails.
    #[instrument(skip_all, fields(url = %url))]
    pub async fn connect(url: &Url) -> Result<(Self, Incoming), LiveError> {
        let (stream, _response) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .map_err(|e| LiveError::Connect(e.to_string()))?;
        info!("Live chat connected");

        let (mut sink, mut source) = stream.split();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<String>();
        let (in_tx, in_rx) = mpsc::unbounded_channel();
        let connected = Arc::new(AtomicBool::new(true));

        let writer = tokio::spawn({
            let connected = Arc::clone(&connected);
            async move {
                while let Some(text) = out_rx.recv().await {
                    if let Err(e) = sink.send(Message::text(text)).await {
                        connected.store(false, Ordering::Release);
                        out_rx.close();
                        let mut dropped = 1_usize;
                        while out_rx.try_recv().is_ok() {
                            dropped += 1;
                        }
                        warn!(error = %e, dropped, "Live chat send failed");
                        break;
                    }
                }
                connected.store(false, Ordering::Release);
                let _ = sink.close().await;
            }
        });

        let reader = tokio::spawn({
            let connected = Arc::clone(&connected);
            async move {
                while let Some(frame) = source.next().await {
                    match frame {
                        Ok(Message::Text(text)) => {
                            let Some(payload) = decode_frame(text.as_str()) else {
                                continue;
                            };
                            if in_tx.send(payload).is_err() {
                                break;
                            }
                        }
                        Ok(Message::Close(_)) => break,
                        Ok(_) => {}
                        Err(e) => {
                            warn!(error = %e, "Live chat receive failed");
                            break;
                        }
                    }
                }
                connected.store(false, Ordering::Release);
                info!("Live chat disconnected");
            }
        });

        Ok((
            Self {
                outbound: out_tx,
                connected,
                reader,
                writer,
            },
            Incoming { receiver: in_rx },
        ))
    }
}

impl LiveChannel for WebSocketChannel {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire) && !self.outbound.is_closed()
    }

    fn emit(&self, message: &OutboundMessage) -> Result<(), LiveError> {
        if !self.is_connected() {
            return Err(LiveError::Closed);
        }
        let frame = serde_json::to_string(&Envelope::chat(message))
            .map_err(|e| LiveError::Encode(e.to_string()))?;
        self.outbound.send(frame).map_err(|_| LiveError::Closed)
    }
}

impl Drop for WebSocketChannel {
    fn drop(&mut self) {
        self.reader.abort();
        self.writer.abort();
    }
}

/// Extract the chat payload from a text frame.
///
/// Frames for other events, and frames that are not envelopes, yield `None`.
fn decode_frame(text: &str) -> Option<serde_json::Value> {
    match serde_json::from_str::<Envelope<serde_json::Value>>(text) {
        Ok(envelope) if envelope.event == LIVE_CHAT_EVENT => Some(envelope.data),
        Ok(envelope) => {
            debug!(event = %envelope.event, "Ignoring live event");
            None
        }
        Err(e) => {
            debug!(error = %e, "Ignoring undecodable frame");
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use cinecart_core::SenderId;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_decode_frame_chat_event() {
        let frame = r#"{"event":"liveChatMessage","data":{"text":"hi","senderId":"user-1"}}"#;
        assert_eq!(
            decode_frame(frame),
            Some(json!({"text": "hi", "senderId": "user-1"}))
        );
    }

    #[test]
    fn test_decode_frame_ignores_other_events() {
        assert!(decode_frame(r#"{"event":"typing","data":{}}"#).is_none());
        assert!(decode_frame("not json").is_none());
        assert!(decode_frame(r#"{"text":"no envelope"}"#).is_none());
    }

    #[tokio::test]
    async fn test_emit_fails_once_peer_has_closed() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
            let _ = ws.close(None).await;
        });

        let url = Url::parse(&format!("ws://{addr}/live")).unwrap();
        let (channel, _incoming) = WebSocketChannel::connect(&url).await.unwrap();
        server.await.unwrap();

        for _ in 0..100 {
            if !channel.is_connected() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        assert!(!channel.is_connected());

        let message = OutboundMessage {
            text: "anyone there?".to_string(),
            sender_id: SenderId::new("user-1"),
            sender_name: "Tester".to_string(),
        };
        assert!(matches!(channel.emit(&message), Err(LiveError::Closed)));
    }

    #[tokio::test]
    async fn test_connect_refused() {
        let url = Url::parse("ws://127.0.0.1:9/live").unwrap();
        assert!(matches!(
            WebSocketChannel::connect(&url).await,
            Err(LiveError::Connect(_))
        ));
    }
}
