//! Error types for login and registration.

use thiserror::Error;

use cinecart_core::EmailError;

use crate::api::ApiError;

/// Errors that can occur while logging in or registering.
///
/// The first group is raised locally before any request is made.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("email is required")]
    MissingEmail,

    #[error("invalid email: {0}")]
    InvalidEmail(#[source] EmailError),

    #[error("password is required")]
    MissingPassword,

    #[error("full name is required")]
    MissingName,

    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("document number must have {expected} digits")]
    InvalidDocument { expected: usize },

    /// The backend refused the email/password pair (400/401 on login).
    #[error("email or password is incorrect")]
    InvalidCredentials,

    /// An account with this email or document already exists (409).
    #[error("an account with this email or document already exists")]
    AlreadyRegistered,

    /// The backend rejected the registration data (400).
    #[error("registration rejected: {}", .0.as_deref().unwrap_or("invalid data"))]
    Rejected(Option<String>),

    /// Login succeeded but the response carried no token.
    #[error("login response did not include a token")]
    NoToken,

    #[error(transparent)]
    Api(#[from] ApiError),
}
