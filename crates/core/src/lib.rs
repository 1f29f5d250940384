//! Cinecart Core - Shared domain types.
//!
//! This crate provides the types used by the Cinecart client library and CLI:
//! - `client` - Cart store, chat sessions and backend API client
//! - `cli` - Command-line front end standing in for the mobile screens
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no HTTP
//! clients, no async runtime. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, emails, products and chat messages

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
