//! Core types for Cinecart.
//!
//! This module provides type-safe wrappers for the catalog and chat domains.

pub mod email;
pub mod id;
pub mod message;
pub mod price;
pub mod product;

pub use email::{Email, EmailError};
pub use id::{MessageId, OrderId, ProductId, SenderId};
pub use message::{ChatMessage, IncomingMessage, MessageRejected, parse_message};
pub use price::Price;
pub use product::Product;
