// Credential storage and session-expiry policy.
//
// The admin API hands out one bearer token at login. The token lives in a
// single persistent slot (keyring in production, memory in tests) and is a
// fallback only -- the session cookie, when present, always wins. A 401
// invalidates the slot process-wide.

use std::sync::{Arc, RwLock};

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;

// ── Token storage ────────────────────────────────────────────────────

/// Persistent storage for the single fallback bearer token.
///
/// Implementations are infallible from the caller's perspective: storage
/// backends that can fail (keyring) log and degrade rather than propagate,
/// mirroring how browser local storage behaves for the original console.
pub trait TokenStore: Send + Sync {
    /// Load the persisted token, if any.
    fn load(&self) -> Option<String>;

    /// Persist a new token, replacing any existing one.
    fn save(&self, token: &str);

    /// Remove the persisted token.
    fn clear(&self);
}

/// In-memory token store. Used by tests and as a session-scoped fallback
/// when no platform keyring is available.
#[derive(Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeded store, convenient for tests.
    pub fn with_token(token: &str) -> Self {
        Self {
            token: RwLock::new(Some(token.to_owned())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<String> {
        self.token.read().ok()?.clone()
    }

    fn save(&self, token: &str) {
        if let Ok(mut guard) = self.token.write() {
            *guard = Some(token.to_owned());
        }
    }

    fn clear(&self) {
        if let Ok(mut guard) = self.token.write() {
            *guard = None;
        }
    }
}

// ── Session-expiry policy ────────────────────────────────────────────

/// Policy invoked by the HTTP client when the admin API signals an expired
/// session (HTTP 401): the stored fallback credential is cleared, affecting
/// all subsequent calls process-wide. The client then propagates the
/// failure to the caller -- no retry, no redirect.
pub struct CredentialPolicy {
    tokens: Arc<dyn TokenStore>,
}

impl CredentialPolicy {
    pub fn new(tokens: Arc<dyn TokenStore>) -> Self {
        Self { tokens }
    }

    /// Clear the stored fallback credential.
    pub fn invalidate(&self) {
        debug!("session expired -- clearing stored token");
        self.tokens.clear();
    }
}

// ── Login / logout operations ────────────────────────────────────────

#[derive(Deserialize)]
struct LoginPayload {
    token: String,
}

impl ApiClient {
    /// Authenticate with the admin API and persist the issued bearer token.
    ///
    /// The server also sets a session cookie in the client's jar; the
    /// persisted token only matters once that cookie is gone.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<(), Error> {
        debug!("logging in as {email}");

        let body = json!({
            "email": email,
            "password": password.expose_secret(),
        });

        let payload: LoginPayload = self.post("auth/login", &body).await?;
        self.tokens().save(&payload.token);

        debug!("login successful");
        Ok(())
    }

    /// End the current session and clear the persisted token.
    ///
    /// The token is cleared even when the server call fails -- a dead
    /// session on the server must not leave a live credential locally.
    pub async fn logout(&self) -> Result<(), Error> {
        let result = self.post_unit("auth/logout", &json!({})).await;
        self.tokens().clear();

        match result {
            // An already-expired session is a successful logout.
            Err(Error::SessionExpired) => Ok(()),
            other => other,
        }
    }
}
