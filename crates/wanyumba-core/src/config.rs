// ── Runtime console configuration ──
//
// Describes *how* to reach the admin API. Built by the CLI from settings
// and handed in -- core never touches disk.

use std::time::Duration;

use url::Url;

/// Configuration for a console session.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Admin API base URL, including the API prefix
    /// (e.g. `http://localhost:3005/api/v1`).
    pub base_url: Url,

    /// Absolute path of the push channel endpoint on the same host.
    pub ws_path: String,

    /// Fixed per-call budget for every HTTP request.
    pub timeout: Duration,

    /// Activate the push channel on connect.
    pub push_enabled: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3005/api/v1"
                .parse()
                .expect("default base URL is valid"),
            ws_path: "/ws".into(),
            timeout: Duration::from_secs(30),
            push_enabled: true,
        }
    }
}
