//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help
//! text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use wanyumba_core::CoreError;

/// Exit codes emitted by the binary.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(wanyumba::auth_failed),
        help("Log in again with: wanyumba login")
    )]
    AuthFailed { message: String },

    #[error("Could not reach the admin API: {reason}")]
    #[diagnostic(
        code(wanyumba::connection_failed),
        help(
            "Check that the admin API is running and reachable.\n\
             Override the URL with --api-url or WANYUMBA_API_URL."
        )
    )]
    ConnectionFailed { reason: String },

    #[error("Request timed out after {timeout_secs}s")]
    #[diagnostic(
        code(wanyumba::timeout),
        help("Raise the budget with --timeout if the API is just slow.")
    )]
    Timeout { timeout_secs: u64 },

    #[error("{message}")]
    #[diagnostic(code(wanyumba::rejected))]
    Rejected { message: String },

    #[error("Invalid {field}: {reason}")]
    #[diagnostic(code(wanyumba::validation))]
    Validation { field: String, reason: String },

    #[error("{0}")]
    #[diagnostic(code(wanyumba::config))]
    Config(#[from] wanyumba_config::ConfigError),

    #[error("Terminal interaction failed: {reason}")]
    #[diagnostic(code(wanyumba::terminal))]
    Terminal { reason: String },
}

impl CliError {
    /// Stable exit code for scripting.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            _ => exit_code::GENERAL,
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },
            CoreError::ConnectionFailed { reason } => CliError::ConnectionFailed { reason },
            CoreError::Timeout { timeout_secs } => CliError::Timeout { timeout_secs },
            CoreError::Rejected { message } => CliError::Rejected { message },
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Internal(message) => CliError::Rejected { message },
        }
    }
}
