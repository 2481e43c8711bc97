use thiserror::Error;

/// Fallback failure message when the server supplies nothing usable.
pub const FALLBACK_MESSAGE: &str = "Something went wrong";

/// Top-level error type for the `wanyumba-api` crate.
///
/// Covers every failure mode of the wire layer: authentication, transport,
/// envelope-level logical failures, and the push channel. `wanyumba-core`
/// maps these into container error strings via [`Error::user_message`].
#[derive(Debug, Error)]
pub enum Error {
    /// The session was rejected (HTTP 401). By the time this is returned
    /// the stored fallback token has already been invalidated.
    #[error("Session expired -- re-authentication required")]
    SessionExpired,

    /// Logical failure reported by the admin API (`success: false`).
    #[error("{message}")]
    Api { message: String },

    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Request exceeded the fixed per-call budget.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Push channel connection failed.
    #[error("Push channel connection failed: {0}")]
    PushConnect(String),

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this error indicates the session has expired
    /// and re-authentication might resolve it.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::SessionExpired)
    }

    /// Returns `true` if this is a transient error worth re-dispatching.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } | Self::PushConnect(_) => true,
            _ => false,
        }
    }

    /// Best-effort human-readable message for state containers.
    ///
    /// Server-provided messages come through [`Error::Api`] already
    /// prioritized (nested error message over top-level message); transport
    /// failures fall back to their own text; anything else collapses to
    /// [`FALLBACK_MESSAGE`].
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { message } => message.clone(),
            Self::SessionExpired | Self::Timeout { .. } => self.to_string(),
            Self::Transport(e) => e.to_string(),
            Self::InvalidUrl(_) | Self::PushConnect(_) | Self::Deserialization { .. } => {
                FALLBACK_MESSAGE.to_owned()
            }
        }
    }
}
