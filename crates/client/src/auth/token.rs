//! Bearer token storage.
//!
//! Persisting the token securely is the host platform's job (keychain,
//! keystore). The client only needs the small [`TokenStore`] seam;
//! [`MemoryTokenStore`] backs tests and the CLI.

use std::sync::{PoisonError, RwLock};

use secrecy::SecretString;

/// Where the session's bearer token lives.
pub trait TokenStore: Send + Sync {
    /// The current token, if logged in.
    fn token(&self) -> Option<SecretString>;

    /// Replace the stored token.
    fn store(&self, token: SecretString);

    /// Forget the stored token.
    fn clear(&self);
}

/// Process-memory token store.
///
/// Implements `Debug` manually to redact the token.
#[derive(Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<SecretString>>,
}

impl MemoryTokenStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `token`.
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(SecretString::from(token.into()))),
        }
    }
}

impl std::fmt::Debug for MemoryTokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let present = self
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some();
        f.debug_struct("MemoryTokenStore")
            .field("token", if present { &"[REDACTED]" } else { &"None" })
            .finish()
    }
}

impl TokenStore for MemoryTokenStore {
    fn token(&self) -> Option<SecretString> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn store(&self, token: SecretString) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    fn clear(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn test_store_and_clear() {
        let store = MemoryTokenStore::new();
        assert!(store.token().is_none());

        store.store(SecretString::from("abc"));
        assert_eq!(store.token().unwrap().expose_secret(), "abc");

        store.clear();
        assert!(store.token().is_none());
    }

    #[test]
    fn test_debug_redacts_token() {
        let store = MemoryTokenStore::with_token("super_secret_token");
        let debug_output = format!("{store:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_token"));
    }
}
