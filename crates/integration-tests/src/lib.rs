//! Integration tests for Cinecart.
//!
//! Tests drive the real client against [`FakeBackend`], an in-process `axum`
//! server bound to an ephemeral port that speaks the same REST and WebSocket
//! protocol as the production backend.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p cinecart-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `auth` - Login and registration
//! - `catalog` - Product fetch, caching, checkout
//! - `ai_chat` - Assistant chat against scripted replies
//! - `live_chat` - Two clients on the live socket

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use cinecart_client::{ClientConfig, ConfigError};

/// Token issued on successful login.
pub const TOKEN: &str = "test-token";

/// The one account the backend knows about at start.
pub const EMAIL: &str = "ana@example.com";
pub const PASSWORD: &str = "secret1";

/// Document number the backend rejects with 400.
pub const REJECTED_DOCUMENT: &str = "00000000000";

/// How the fake assistant answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiMode {
    /// `{"text": "You said: <message>"}`
    Echo,
    /// `{}`
    Empty,
    /// 500 with `{"message": "model offline"}`
    Error,
    /// Echo after two seconds.
    Slow,
}

struct FakeState {
    accounts: Mutex<Vec<String>>,
    orders: Mutex<Vec<Value>>,
    next_order: AtomicU64,
    fail_orders: AtomicBool,
    order_delay_ms: AtomicU64,
    product_requests: AtomicUsize,
    ai_mode: Mutex<AiMode>,
    live: broadcast::Sender<(u64, String)>,
    next_connection: AtomicU64,
    live_clients: AtomicUsize,
}

/// A running fake backend. Stops when dropped.
pub struct FakeBackend {
    addr: SocketAddr,
    state: Arc<FakeState>,
    server: JoinHandle<()>,
}

impl FakeBackend {
    /// Bind to an ephemeral port and start serving.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn start() -> std::io::Result<Self> {
        let (live, _) = broadcast::channel(64);
        let state = Arc::new(FakeState {
            accounts: Mutex::new(vec![EMAIL.to_string()]),
            orders: Mutex::new(Vec::new()),
            next_order: AtomicU64::new(1001),
            fail_orders: AtomicBool::new(false),
            order_delay_ms: AtomicU64::new(0),
            product_requests: AtomicUsize::new(0),
            ai_mode: Mutex::new(AiMode::Echo),
            live,
            next_connection: AtomicU64::new(0),
            live_clients: AtomicUsize::new(0),
        });

        let app = Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/auth/register", post(register))
            .route("/api/products", get(products))
            .route("/api/orders", post(orders))
            .route("/api/chat/ai", post(ai_chat))
            .route("/live", get(live_upgrade))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            addr,
            state,
            server,
        })
    }

    /// Client configuration pointing at this backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the address does not form a valid URL.
    pub fn config(&self) -> Result<ClientConfig, ConfigError> {
        ClientConfig::new(&format!("http://{}", self.addr))
    }

    pub fn set_ai_mode(&self, mode: AiMode) {
        *self.state.ai_mode.lock().unwrap_or_else(PoisonError::into_inner) = mode;
    }

    pub fn fail_orders(&self, fail: bool) {
        self.state.fail_orders.store(fail, Ordering::SeqCst);
    }

    /// Hold every order response for `delay` before answering.
    pub fn delay_orders(&self, delay: Duration) {
        let millis = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self.state.order_delay_ms.store(millis, Ordering::SeqCst);
    }

    /// Order bodies received so far.
    #[must_use]
    pub fn orders(&self) -> Vec<Value> {
        self.state
            .orders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// How many times the catalog was requested.
    #[must_use]
    pub fn product_requests(&self) -> usize {
        self.state.product_requests.load(Ordering::SeqCst)
    }

    /// Wait until `count` live chat clients are subscribed, up to two seconds.
    pub async fn wait_for_live_clients(&self, count: usize) -> bool {
        for _ in 0..100 {
            if self.state.live_clients.load(Ordering::SeqCst) >= count {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        false
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    senha: String,
}

async fn login(State(state): State<Arc<FakeState>>, Json(body): Json<LoginBody>) -> Response {
    let known = state
        .accounts
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .contains(&body.email);
    if known && body.senha == PASSWORD {
        Json(json!({ "token": TOKEN })).into_response()
    } else {
        error(StatusCode::UNAUTHORIZED, "Credenciais inválidas")
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterBody {
    nome_completo: String,
    cpf: String,
    email: String,
    senha: String,
}

async fn register(State(state): State<Arc<FakeState>>, Json(body): Json<RegisterBody>) -> Response {
    if body.nome_completo.is_empty() || body.senha.is_empty() || body.cpf == REJECTED_DOCUMENT {
        return error(StatusCode::BAD_REQUEST, "CPF inválido");
    }
    let mut accounts = state.accounts.lock().unwrap_or_else(PoisonError::into_inner);
    if accounts.contains(&body.email) {
        return error(StatusCode::CONFLICT, "Email já cadastrado");
    }
    accounts.push(body.email);
    (StatusCode::CREATED, Json(json!({ "message": "created" }))).into_response()
}

async fn products(State(state): State<Arc<FakeState>>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Token inválido");
    }
    state.product_requests.fetch_add(1, Ordering::SeqCst);
    Json(json!([
        {"id": 1, "nome": "Dune: Part Two", "preco": 19.99, "imagemUrl": "https://img.example/dune.jpg"},
        {"id": "2", "name": "Popcorn", "price": "5.00", "imageUrl": null},
        {"id": 3, "nome": "Mystery Box", "preco": null}
    ]))
    .into_response()
}

async fn orders(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return error(StatusCode::FORBIDDEN, "Token inválido");
    }
    let delay = state.order_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
    if state.fail_orders.load(Ordering::SeqCst) {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "Payment gateway down");
    }
    let is_empty = body["items"].as_array().is_none_or(Vec::is_empty);
    if is_empty {
        return error(StatusCode::BAD_REQUEST, "Carrinho vazio");
    }
    state
        .orders
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(body);
    let order_id = state.next_order.fetch_add(1, Ordering::SeqCst);
    (StatusCode::CREATED, Json(json!({ "orderId": order_id }))).into_response()
}

#[derive(Deserialize)]
struct AiBody {
    message: String,
}

async fn ai_chat(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Json(body): Json<AiBody>,
) -> Response {
    if !authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Token inválido");
    }
    let mode = *state.ai_mode.lock().unwrap_or_else(PoisonError::into_inner);
    match mode {
        AiMode::Echo => Json(json!({ "text": format!("You said: {}", body.message) })).into_response(),
        AiMode::Empty => Json(json!({})).into_response(),
        AiMode::Error => error(StatusCode::INTERNAL_SERVER_ERROR, "model offline"),
        AiMode::Slow => {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Json(json!({ "text": format!("You said: {}", body.message) })).into_response()
        }
    }
}

async fn live_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<FakeState>>) -> Response {
    ws.on_upgrade(move |socket| live_connection(socket, state))
}

/// Relay every text frame to every other connection, never back to its sender.
async fn live_connection(socket: WebSocket, state: Arc<FakeState>) {
    let id = state.next_connection.fetch_add(1, Ordering::SeqCst);
    let mut relay = state.live.subscribe();
    state.live_clients.fetch_add(1, Ordering::SeqCst);
    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    let _ = state.live.send((id, text.to_string()));
                }
                Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
            relayed = relay.recv() => match relayed {
                Ok((from, text)) if from != id => {
                    if sink.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }

    state.live_clients.fetch_sub(1, Ordering::SeqCst);
}
