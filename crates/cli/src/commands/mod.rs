//! Command implementations.

pub mod account;
pub mod catalog;
pub mod chat;

use std::sync::Arc;

use cinecart_client::{
    ApiClient, AuthSession, CartStore, ClientConfig, Credentials, MemoryTokenStore,
};

/// Build a client and log in with the given credentials.
///
/// # Errors
///
/// Returns an error if credentials are missing or invalid, or the backend
/// refuses them.
pub async fn login(
    config: &ClientConfig,
    email: Option<String>,
    password: Option<String>,
) -> Result<AuthSession, Box<dyn std::error::Error>> {
    let credentials = Credentials::new(
        email.as_deref().unwrap_or_default(),
        password.as_deref().unwrap_or_default(),
    )?;

    let session = anonymous_session(config)?;
    session.login(&credentials).await?;
    Ok(session)
}

/// Build a client with no token.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built.
pub fn anonymous_session(config: &ClientConfig) -> Result<AuthSession, Box<dyn std::error::Error>> {
    let api = ApiClient::new(config, Arc::new(MemoryTokenStore::new()))?;
    Ok(AuthSession::new(api, CartStore::new()))
}
