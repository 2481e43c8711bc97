//! Settings and credential storage for the Wanyumba admin console.
//!
//! TOML settings file with `WANYUMBA_*` env overrides, and the
//! keyring-backed store for the single persisted bearer token. The CLI
//! loads [`Settings`] and translates them into a
//! [`wanyumba_core::ConsoleConfig`].

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use keyring::Entry;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use wanyumba_api::TokenStore;
use wanyumba_core::ConsoleConfig;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize settings: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("settings loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Settings ────────────────────────────────────────────────────────

/// Console settings, layered defaults → TOML file → `WANYUMBA_*` env.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    /// Admin API base URL, including the API prefix.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Absolute path of the push channel endpoint.
    #[serde(default = "default_ws_path")]
    pub ws_path: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Activate the push channel on connect.
    #[serde(default = "default_push")]
    pub push: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            ws_path: default_ws_path(),
            timeout: default_timeout(),
            push: default_push(),
        }
    }
}

fn default_api_url() -> String {
    "http://localhost:3005/api/v1".into()
}
fn default_ws_path() -> String {
    "/ws".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_push() -> bool {
    true
}

/// Path of the settings file under the platform config directory.
pub fn settings_path() -> PathBuf {
    ProjectDirs::from("com", "Wanyumba", "wanyumba")
        .map(|dirs| dirs.config_dir().join("wanyumba.toml"))
        .unwrap_or_else(|| PathBuf::from("wanyumba.toml"))
}

impl Settings {
    /// Load settings from the default file path plus env overrides.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&settings_path())
    }

    /// Load settings from an explicit file path plus env overrides.
    pub fn load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        let figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("WANYUMBA_"));
        Ok(figment.extract()?)
    }

    /// Write the settings file, creating parent directories as needed.
    pub fn save(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Translate into the core runtime configuration.
    pub fn console_config(&self) -> Result<ConsoleConfig, ConfigError> {
        let base_url: url::Url = self.api_url.parse().map_err(|e| ConfigError::Validation {
            field: "api_url".into(),
            reason: format!("invalid URL '{}': {e}", self.api_url),
        })?;

        Ok(ConsoleConfig {
            base_url,
            ws_path: self.ws_path.clone(),
            timeout: Duration::from_secs(self.timeout),
            push_enabled: self.push,
        })
    }
}

// ── Keyring-backed token storage ────────────────────────────────────

const KEYRING_SERVICE: &str = "wanyumba";
const KEYRING_KEY: &str = "token";

/// Platform-keyring store for the single persisted bearer token.
///
/// Keyring failures degrade to "no stored token" rather than propagate --
/// the token is a fallback credential, and a console without one simply
/// prompts for login again.
#[derive(Debug, Default)]
pub struct KeyringTokenStore;

impl KeyringTokenStore {
    pub fn new() -> Self {
        Self
    }

    fn entry() -> Option<Entry> {
        match Entry::new(KEYRING_SERVICE, KEYRING_KEY) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "platform keyring unavailable");
                None
            }
        }
    }
}

impl TokenStore for KeyringTokenStore {
    fn load(&self) -> Option<String> {
        Self::entry()?.get_password().ok()
    }

    fn save(&self, token: &str) {
        if let Some(entry) = Self::entry() {
            if let Err(e) = entry.set_password(token) {
                warn!(error = %e, "failed to persist token to keyring");
            }
        }
    }

    fn clear(&self) {
        if let Some(entry) = Self::entry() {
            // A missing credential is already the desired state.
            let _ = entry.delete_credential();
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────
