//! Session credential store.
//!
//! Holds the bearer token for the current admin session. The store is an
//! explicitly owned handle: clones share the same slot, so the API gateway
//! and the route guard observe the same credential.
//!
//! # Lifecycle
//!
//! - `set` after a successful login
//! - `clear` on logout, or by the gateway on the first `401` response
//!
//! Storage beyond the process (browser storage, keychain) is the caller's
//! concern; see [`SessionStore::with_credential`] for seeding a saved token.

use std::sync::Arc;

use reqwest::header::HeaderValue;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::RwLock;
use tracing::debug;

/// An opaque bearer token.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct Credential(SecretString);

impl Credential {
    /// Wrap a token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// Expose the raw token.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// Build the `Authorization` header value, marked sensitive.
    ///
    /// Returns `None` if the token contains characters that cannot appear in
    /// a header.
    pub(crate) fn bearer_header(&self) -> Option<HeaderValue> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", self.expose())).ok()?;
        value.set_sensitive(true);
        Some(value)
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}

impl From<SecretString> for Credential {
    fn from(token: SecretString) -> Self {
        Self(token)
    }
}

/// Holder of the current credential.
#[derive(Clone, Default)]
pub struct SessionStore {
    slot: Arc<RwLock<Option<Credential>>>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with a previously saved credential.
    #[must_use]
    pub fn with_credential(credential: Credential) -> Self {
        Self {
            slot: Arc::new(RwLock::new(Some(credential))),
        }
    }

    /// Replace the current credential.
    pub async fn set(&self, credential: Credential) {
        *self.slot.write().await = Some(credential);
        debug!("session credential set");
    }

    /// Get the current credential, if any.
    pub async fn get(&self) -> Option<Credential> {
        self.slot.read().await.clone()
    }

    /// Drop the current credential.
    ///
    /// Returns whether a credential was present.
    pub async fn clear(&self) -> bool {
        let previous = self.slot.write().await.take();
        if previous.is_some() {
            debug!("session credential cleared");
        }
        previous.is_some()
    }

    /// Whether a credential is present. Used to gate page access.
    pub async fn is_authenticated(&self) -> bool {
        self.slot.read().await.is_some()
    }
}
