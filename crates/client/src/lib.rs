//! Cinecart client library.
//!
//! The shared state and backend plumbing behind the Cinecart app: the cart
//! store, the assistant and live chat sessions, and the HTTP and WebSocket
//! clients they talk through.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod auth;
pub mod cart;
pub mod chat;
pub mod checkout;
pub mod config;
pub mod live;

pub use api::{ApiClient, ApiError};
pub use auth::{AuthError, AuthSession, Credentials, MemoryTokenStore, Registration, TokenStore};
pub use cart::{Cart, CartLine, CartStore};
pub use chat::{AiChatSession, ChatLog, FailureKind, LiveChatSession};
pub use checkout::{Checkout, CheckoutError, PlacedOrder};
pub use config::{ClientConfig, ConfigError};
