// ── Core error types ──
//
// User-facing errors from wanyumba-core. Consumers never see raw HTTP
// status codes or JSON parse failures -- the `From<wanyumba_api::Error>`
// impl translates wire-layer errors into domain-appropriate variants.
// Fetch failures never surface here at all: they land in the matching
// container's `error` field instead.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Cannot reach the admin API: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Operation rejected: {message}")]
    Rejected { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from wire-layer errors ────────────────────────────────

impl From<wanyumba_api::Error> for CoreError {
    fn from(err: wanyumba_api::Error) -> Self {
        match err {
            wanyumba_api::Error::SessionExpired => CoreError::AuthenticationFailed {
                message: "Session expired -- please log in again".into(),
            },
            wanyumba_api::Error::Api { message } => CoreError::Rejected { message },
            wanyumba_api::Error::Transport(ref e) => {
                if e.is_connect() {
                    CoreError::ConnectionFailed {
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Rejected {
                        message: e.to_string(),
                    }
                }
            }
            wanyumba_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            wanyumba_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            wanyumba_api::Error::PushConnect(reason) => CoreError::ConnectionFailed { reason },
            wanyumba_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
