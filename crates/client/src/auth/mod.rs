//! Login, registration and the logged-in session.
//!
//! Form input is validated locally into [`Credentials`] or [`Registration`]
//! before anything is sent. [`AuthSession`] owns the token store and the cart
//! so that logging out resets both together.

mod error;
mod token;

pub use error::AuthError;
pub use token::{MemoryTokenStore, TokenStore};

use secrecy::{ExposeSecret, SecretString};
use tracing::{info, instrument, warn};

use cinecart_core::Email;

use crate::api::{ApiClient, ApiError};
use crate::cart::CartStore;

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Number of digits in a national document number.
pub const DOCUMENT_DIGITS: usize = 11;

/// A validated email/password pair.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct Credentials {
    email: Email,
    password: SecretString,
}

impl Credentials {
    /// Validate login form input.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingEmail`, `AuthError::InvalidEmail` or
    /// `AuthError::MissingPassword`.
    pub fn new(email: &str, password: &str) -> Result<Self, AuthError> {
        let email = parse_email(email)?;
        if password.is_empty() {
            return Err(AuthError::MissingPassword);
        }
        Ok(Self {
            email,
            password: SecretString::from(password),
        })
    }

    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.email
    }

    #[must_use]
    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Validated account registration data.
#[derive(Clone)]
pub struct Registration {
    full_name: String,
    document: String,
    email: Email,
    password: SecretString,
}

impl Registration {
    /// Validate registration form input.
    ///
    /// `document` may contain formatting (`123.456.789-09`); only its digits
    /// are kept.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure found, checking name, email,
    /// password, confirmation and document in that order.
    pub fn new(
        full_name: &str,
        document: &str,
        email: &str,
        password: &str,
        confirmation: &str,
    ) -> Result<Self, AuthError> {
        let full_name = full_name.trim();
        if full_name.is_empty() {
            return Err(AuthError::MissingName);
        }
        let email = parse_email(email)?;
        if password.is_empty() {
            return Err(AuthError::MissingPassword);
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::PasswordTooShort {
                min: MIN_PASSWORD_LEN,
            });
        }
        if password != confirmation {
            return Err(AuthError::PasswordMismatch);
        }
        let document: String = document.chars().filter(char::is_ascii_digit).collect();
        if document.len() != DOCUMENT_DIGITS {
            return Err(AuthError::InvalidDocument {
                expected: DOCUMENT_DIGITS,
            });
        }

        Ok(Self {
            full_name: full_name.to_string(),
            document,
            email,
            password: SecretString::from(password),
        })
    }

    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Document number, digits only.
    #[must_use]
    pub fn document(&self) -> &str {
        &self.document
    }

    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.email
    }

    #[must_use]
    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("full_name", &self.full_name)
            .field("email", &self.email)
            .field("document", &"[REDACTED]")
            .field("password", &"[REDACTED]")
            .finish()
    }
}

fn parse_email(raw: &str) -> Result<Email, AuthError> {
    if raw.trim().is_empty() {
        return Err(AuthError::MissingEmail);
    }
    Email::parse(raw).map_err(AuthError::InvalidEmail)
}

/// The logged-in session: API client, token store and cart.
#[derive(Debug, Clone)]
pub struct AuthSession {
    api: ApiClient,
    cart: CartStore,
}

impl AuthSession {
    #[must_use]
    pub const fn new(api: ApiClient, cart: CartStore) -> Self {
        Self { api, cart }
    }

    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    #[must_use]
    pub const fn cart(&self) -> &CartStore {
        &self.cart
    }

    /// Whether a token is stored.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.api.tokens().token().is_some()
    }

    /// Log in and store the returned token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` when the backend refuses the
    /// pair, `AuthError::NoToken` when it answers without a token, and
    /// `AuthError::Api` for anything else.
    #[instrument(skip(self, credentials), fields(email = %credentials.email()))]
    pub async fn login(&self, credentials: &Credentials) -> Result<(), AuthError> {
        let response = self.api.login(credentials).await.map_err(|e| match e {
            ApiError::Unauthorized { .. } | ApiError::Validation(_) => AuthError::InvalidCredentials,
            other => AuthError::Api(other),
        })?;

        let token = response
            .token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::NoToken)?;
        self.api.tokens().store(SecretString::from(token));
        self.api.invalidate_catalog().await;

        info!("Logged in");
        Ok(())
    }

    /// Create an account. Does not log in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AlreadyRegistered` on 409, `AuthError::Rejected`
    /// on 400 and `AuthError::Api` for anything else.
    #[instrument(skip(self, registration), fields(email = %registration.email()))]
    pub async fn register(&self, registration: &Registration) -> Result<(), AuthError> {
        self.api
            .register(registration)
            .await
            .map_err(|e| match e {
                ApiError::Conflict(_) => AuthError::AlreadyRegistered,
                ApiError::Validation(message) => AuthError::Rejected(message),
                other => AuthError::Api(other),
            })?;
        info!("Account registered");
        Ok(())
    }

    /// Forget the token, empty the cart and drop the cached catalog.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        self.api.tokens().clear();
        self.cart.clear();
        self.api.invalidate_catalog().await;
        info!("Logged out");
    }

    /// Log out if `error` means the session is no longer valid.
    ///
    /// Returns whether a logout happened.
    pub async fn logout_on_auth_failure(&self, error: &ApiError) -> bool {
        if error.is_auth_failure() {
            warn!(error = %error, "Session expired, logging out");
            self.logout().await;
            true
        } else {
            false
        }
    }
}
