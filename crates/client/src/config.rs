//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CINECART_API_URL` - Base URL of the backend (e.g., `http://192.168.1.8:4000`)
//!
//! ## Optional
//! - `CINECART_LIVE_CHAT_URL` - WebSocket URL of the live chat
//!   (default: API URL with `ws`/`wss` scheme and `/live` path)
//! - `CINECART_USER_NAME` - Display name used in the live chat (default: `Test User`)
//! - `CINECART_HTTP_TIMEOUT_SECS` - Per-request timeout (default: none)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_USER_NAME: &str = "Test User";
const LIVE_CHAT_PATH: &str = "live";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL, always ending in `/`
    pub api_url: Url,
    /// Live chat WebSocket URL
    pub live_chat_url: Url,
    /// Display name sent with live chat messages
    pub user_name: String,
    /// Per-request HTTP timeout; `None` waits for the transport
    pub http_timeout: Option<Duration>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl ClientConfig {
    /// Build a configuration for `api_url` with every optional setting at its
    /// default.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL does not parse or is
    /// not `http`/`https`.
    pub fn new(api_url: &str) -> Result<Self, ConfigError> {
        let api_url = parse_base_url("CINECART_API_URL", api_url)?;
        let live_chat_url = derive_live_chat_url(&api_url)?;
        Ok(Self {
            api_url,
            live_chat_url,
            user_name: DEFAULT_USER_NAME.to_string(),
            http_timeout: None,
            sentry_dsn: None,
            sentry_environment: None,
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let mut config = Self::new(&get_required_env("CINECART_API_URL")?)?;

        if let Some(raw) = get_optional_env("CINECART_LIVE_CHAT_URL") {
            config.live_chat_url = Url::parse(&raw).map_err(|e| {
                ConfigError::InvalidEnvVar("CINECART_LIVE_CHAT_URL".to_string(), e.to_string())
            })?;
        }
        config.user_name = get_env_or_default("CINECART_USER_NAME", DEFAULT_USER_NAME);
        config.http_timeout = get_optional_env("CINECART_HTTP_TIMEOUT_SECS")
            .map(|raw| parse_timeout("CINECART_HTTP_TIMEOUT_SECS", &raw))
            .transpose()?;
        config.sentry_dsn = get_optional_env("SENTRY_DSN");
        config.sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");

        Ok(config)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable, treating blank values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an `http`/`https` base URL and make sure it ends in `/` so relative
/// endpoint paths join under it.
fn parse_base_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let mut url =
        Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// `http://host:4000/` becomes `ws://host:4000/live`.
fn derive_live_chat_url(api_url: &Url) -> Result<Url, ConfigError> {
    let mut url = api_url
        .join(LIVE_CHAT_PATH)
        .map_err(|e| ConfigError::InvalidEnvVar("CINECART_API_URL".to_string(), e.to_string()))?;
    let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
    url.set_scheme(scheme).map_err(|()| {
        ConfigError::InvalidEnvVar(
            "CINECART_API_URL".to_string(),
            "cannot derive live chat URL".to_string(),
        )
    })?;
    Ok(url)
}

/// Parse a positive whole number of seconds.
fn parse_timeout(key: &str, raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be greater than zero".to_string(),
        )),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(e) => Err(ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
    }
}
