//! HTTP client for the storefront backend.
//!
//! # Endpoints
//!
//! | Method | Path | Auth |
//! |---|---|---|
//! | `GET` | `/api/products` | bearer |
//! | `POST` | `/api/orders` | bearer |
//! | `POST` | `/api/chat/ai` | bearer |
//! | `POST` | `/api/auth/login` | none |
//! | `POST` | `/api/auth/register` | none |
//!
//! The product catalog is cached in memory with `moka` (5 minute TTL).
//! No retries are attempted; a timeout applies only when configured.

mod error;
pub mod types;

pub use error::{ApiError, ApiErrorBody};
pub use types::{AiReply, LoginResponse, OrderConfirmation};

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::{RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use cinecart_core::Product;

use crate::auth::{Credentials, Registration, TokenStore};
use crate::cart::CartLine;
use crate::config::ClientConfig;

use types::{AiRequest, LoginRequest, OrderRequest, RegisterRequest};

const CATALOG_CACHE_KEY: &str = "products";
const CATALOG_TTL: Duration = Duration::from_secs(300);

/// Client for the storefront backend REST API.
///
/// Cheap to clone; clones share the HTTP connection pool, token store and
/// catalog cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    tokens: Arc<dyn TokenStore>,
    catalog: Cache<&'static str, Vec<Product>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Configuration` if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig, tokens: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.http_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ApiError::Configuration(e.to_string()))?;

        let catalog = Cache::builder()
            .max_capacity(1)
            .time_to_live(CATALOG_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.api_url.clone(),
                tokens,
                catalog,
            }),
        })
    }

    /// The token store this client reads bearer tokens from.
    #[must_use]
    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.inner.tokens
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Fetch the product catalog.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::MissingToken` when logged out, and
    /// `ApiError::Unauthorized` on 401/403; callers are expected to force a
    /// logout in both cases.
    #[instrument(skip(self))]
    pub async fn fetch_products(&self) -> Result<Vec<Product>, ApiError> {
        if let Some(products) = self.inner.catalog.get(CATALOG_CACHE_KEY).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let request = self.inner.client.get(self.endpoint("api/products")?);
        let products: Vec<Product> = self.send_json(self.authorize(request)?).await?;
        debug!(count = products.len(), "Products received");

        self.inner
            .catalog
            .insert(CATALOG_CACHE_KEY, products.clone())
            .await;
        Ok(products)
    }

    /// Drop the cached catalog so the next fetch goes to the backend.
    pub async fn invalidate_catalog(&self) {
        self.inner.catalog.invalidate(CATALOG_CACHE_KEY).await;
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Submit an order for `items`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self, items), fields(lines = items.len()))]
    pub async fn submit_order(&self, items: &[CartLine]) -> Result<OrderConfirmation, ApiError> {
        let request = self
            .inner
            .client
            .post(self.endpoint("api/orders")?)
            .json(&OrderRequest { items });
        self.send_json(self.authorize(request)?).await
    }

    // =========================================================================
    // AI chat
    // =========================================================================

    /// Ask the assistant a question.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self, message), fields(len = message.len()))]
    pub async fn ask_ai(&self, message: &str) -> Result<AiReply, ApiError> {
        let request = self
            .inner
            .client
            .post(self.endpoint("api/chat/ai")?)
            .json(&AiRequest { message });
        self.send_json(self.authorize(request)?).await
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Exchange credentials for a token. Does not store it.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self, credentials), fields(email = %credentials.email()))]
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        let request = self
            .inner
            .client
            .post(self.endpoint("api/auth/login")?)
            .json(&LoginRequest {
                email: credentials.email().as_str(),
                password: credentials.password(),
            });
        self.send_json(request).await
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Conflict` for a duplicate account and
    /// `ApiError::Validation` when the backend rejects the data.
    #[instrument(skip(self, registration), fields(email = %registration.email()))]
    pub async fn register(&self, registration: &Registration) -> Result<(), ApiError> {
        let request = self
            .inner
            .client
            .post(self.endpoint("api/auth/register")?)
            .json(&RegisterRequest {
                full_name: registration.full_name(),
                document: registration.document(),
                email: registration.email().as_str(),
                password: registration.password(),
            });
        self.send(request).await.map(drop)
    }

    // =========================================================================
    // Plumbing
    // =========================================================================

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.inner
            .base_url
            .join(path)
            .map_err(|e| ApiError::Configuration(e.to_string()))
    }

    /// Attach the bearer token, failing fast when logged out.
    fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder, ApiError> {
        let token = self.inner.tokens.token().ok_or(ApiError::MissingToken)?;
        Ok(request.bearer_auth(token.expose_secret()))
    }

    /// Send a request and return the body of a successful response.
    async fn send(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            response
                .text()
                .await
                .map_err(|e| ApiError::Transport(e.to_string()))
        } else {
            Err(Self::handle_error_status(status, response).await)
        }
    }

    /// Send a request and decode the JSON body of a successful response.
    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let body = self.send(request).await?;
        serde_json::from_str(&body)
            .map_err(|e| ApiError::Parse(format!("Failed to parse response: {e}")))
    }

    /// Turn a non-success response into an error, keeping the backend's
    /// `message` when the body has one.
    async fn handle_error_status(status: StatusCode, response: reqwest::Response) -> ApiError {
        let message = match response.text().await {
            Ok(body) => serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .filter(|m| !m.trim().is_empty()),
            Err(e) => {
                warn!(error = %e, "Failed to read error body");
                None
            }
        };
        warn!(status = status.as_u16(), message = ?message, "Backend returned an error");
        ApiError::from_status(status.as_u16(), message)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::auth::MemoryTokenStore;

    fn client(tokens: MemoryTokenStore) -> ApiClient {
        let config = ClientConfig::new("http://127.0.0.1:9/base").unwrap();
        ApiClient::new(&config, Arc::new(tokens)).unwrap()
    }

    #[test]
    fn test_endpoint_joins_under_base_path() {
        let api = client(MemoryTokenStore::new());
        assert_eq!(
            api.endpoint("api/products").unwrap().as_str(),
            "http://127.0.0.1:9/base/api/products"
        );
    }

    #[test]
    fn test_authorize_requires_token() {
        let api = client(MemoryTokenStore::new());
        let request = api.inner.client.get("http://127.0.0.1:9/");
        assert!(matches!(
            api.authorize(request),
            Err(ApiError::MissingToken)
        ));
    }

    #[test]
    fn test_authorize_sets_bearer_header() {
        let api = client(MemoryTokenStore::with_token("tok"));
        let request = api
            .authorize(api.inner.client.get("http://127.0.0.1:9/"))
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(
            request.headers().get(reqwest::header::AUTHORIZATION).unwrap(),
            "Bearer tok"
        );
    }

    #[tokio::test]
    async fn test_fetch_products_logged_out_fails_fast() {
        let api = client(MemoryTokenStore::new());
        assert_eq!(api.fetch_products().await, Err(ApiError::MissingToken));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        // Port 9 (discard) is not listening on loopback in test environments.
        let api = client(MemoryTokenStore::new());
        let credentials = Credentials::new("a@b.co", "pw").unwrap();
        let result = api.login(&credentials).await;
        assert!(matches!(result, Err(ApiError::Transport(_))));
    }

    #[test]
    fn test_api_client_is_send_sync_clone() {
        fn assert_traits<T: Send + Sync + Clone>() {}
        assert_traits::<ApiClient>();
    }
}
