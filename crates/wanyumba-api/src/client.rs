// Admin API HTTP client
//
// Wraps `reqwest::Client` with base-URL construction, `{success, data,
// message}` envelope unwrapping, and credential attachment. The session
// cookie (sent automatically from the jar) takes priority; the persisted
// bearer token is attached only when no cookie exists for the base URL.

use std::sync::Arc;

use reqwest::StatusCode;
use reqwest::cookie::{CookieStore, Jar};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::auth::{CredentialPolicy, TokenStore};
use crate::error::{Error, FALLBACK_MESSAGE};
use crate::transport::TransportConfig;

/// Response envelope convention of the admin API.
///
/// Failures can carry the message at the top level or nested under
/// `error`; the nested form wins when both are present.
#[derive(serde::Deserialize)]
struct Envelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<NestedError>,
}

#[derive(serde::Deserialize)]
struct NestedError {
    #[serde(default)]
    message: Option<String>,
}

impl Envelope {
    /// Failure message priority: nested error message, then top-level
    /// message, then the hardcoded fallback.
    fn failure_message(self) -> String {
        self.error
            .and_then(|e| e.message)
            .or(self.message)
            .unwrap_or_else(|| FALLBACK_MESSAGE.to_owned())
    }
}

/// HTTP client for the Wanyumba admin API.
///
/// All methods unwrap the `{ success, data, message }` envelope before the
/// caller sees it: a `success: false` body resolves to [`Error::Api`] with
/// a normalized message, an HTTP 401 invalidates the stored token through
/// the [`CredentialPolicy`] and resolves to [`Error::SessionExpired`].
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    cookie_jar: Arc<Jar>,
    tokens: Arc<dyn TokenStore>,
    policy: CredentialPolicy,
    timeout_secs: u64,
}

impl ApiClient {
    /// Create a new client for the given API base URL.
    ///
    /// If the transport config doesn't already include a cookie jar, one is
    /// created -- session cookies are the primary credential. The base URL
    /// should include the API prefix (e.g. `http://localhost:3005/api/v1`).
    pub fn new(
        base_url: Url,
        tokens: Arc<dyn TokenStore>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let cookie_jar = match &transport.cookie_jar {
            Some(jar) => Arc::clone(jar),
            None => Arc::new(Jar::default()),
        };
        let config = TransportConfig {
            cookie_jar: Some(Arc::clone(&cookie_jar)),
            ..transport.clone()
        };
        let http = config.build_client()?;
        let policy = CredentialPolicy::new(Arc::clone(&tokens));

        Ok(Self {
            http,
            base_url,
            cookie_jar,
            tokens,
            policy,
            timeout_secs: config.timeout.as_secs(),
        })
    }

    /// The API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The token store backing this client.
    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    /// Extract the session cookie header value for the push channel
    /// upgrade request, if the jar holds one.
    pub fn cookie_header(&self) -> Option<String> {
        let cookies = self.cookie_jar.cookies(&self.base_url)?;
        cookies.to_str().ok().map(String::from)
    }

    // ── URL and auth plumbing ────────────────────────────────────────

    /// Build a full URL for an endpoint path under the base URL.
    fn endpoint_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}/{path}")).map_err(Error::InvalidUrl)
    }

    /// Attach the fallback bearer token -- but only when the jar has no
    /// session cookie for the base URL. Cookie credential takes priority;
    /// the header exists for backward compatibility.
    fn apply_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.cookie_jar.cookies(&self.base_url).is_some() {
            return builder;
        }
        match self.tokens.load() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn map_transport(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            Error::Transport(e)
        }
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and unwrap the envelope's `data` payload.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.endpoint_url(path)?;
        debug!("GET {url}");

        let resp = self
            .apply_auth(self.http.get(url))
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        self.parse_data(resp).await
    }

    /// Send a POST request with a JSON body and unwrap `data`.
    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        let url = self.endpoint_url(path)?;
        debug!("POST {url}");

        let resp = self
            .apply_auth(self.http.post(url).json(body))
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        self.parse_data(resp).await
    }

    /// Send a POST request where only the success flag matters.
    pub async fn post_unit(
        &self,
        path: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<(), Error> {
        let url = self.endpoint_url(path)?;
        debug!("POST {url}");

        let resp = self
            .apply_auth(self.http.post(url).json(body))
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        self.read_envelope(resp).await.map(|_| ())
    }

    /// Send a DELETE request where only the success flag matters.
    pub async fn delete_unit(&self, path: &str) -> Result<(), Error> {
        let url = self.endpoint_url(path)?;
        debug!("DELETE {url}");

        let resp = self
            .apply_auth(self.http.delete(url))
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        self.read_envelope(resp).await.map(|_| ())
    }

    // ── Envelope parsing ─────────────────────────────────────────────

    /// Unwrap the envelope and deserialize its `data` payload.
    ///
    /// A `success: true` body without `data` is a failure -- the handler
    /// contract requires the payload field to be present.
    async fn parse_data<T: DeserializeOwned>(&self, resp: reqwest::Response) -> Result<T, Error> {
        let envelope = self.read_envelope(resp).await?;
        let data = envelope.data.ok_or_else(|| Error::Api {
            message: FALLBACK_MESSAGE.to_owned(),
        })?;

        serde_json::from_value(data).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body: String::new(),
        })
    }

    /// Parse the response into the envelope, mapping the session-expiry
    /// signal and `success: false` into typed failures.
    async fn read_envelope(&self, resp: reqwest::Response) -> Result<Envelope, Error> {
        let status = resp.status();

        if status == StatusCode::UNAUTHORIZED {
            // Session-expiry signal: clear the stored fallback credential
            // (process-wide), then surface the failure to the caller.
            self.policy.invalidate();
            return Err(Error::SessionExpired);
        }

        let body = resp.text().await.map_err(|e| self.map_transport(e))?;

        let envelope: Envelope = match serde_json::from_str(&body) {
            Ok(env) => env,
            Err(e) if status.is_success() => {
                let preview: String = body.chars().take(200).collect();
                return Err(Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                });
            }
            // Non-2xx with an unparseable body: all we have is the status.
            Err(_) => {
                return Err(Error::Api {
                    message: format!("HTTP {status}"),
                });
            }
        };

        if envelope.success {
            Ok(envelope)
        } else {
            Err(Error::Api {
                message: envelope.failure_message(),
            })
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn envelope(json: serde_json::Value) -> Envelope {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn nested_error_message_wins() {
        let env = envelope(serde_json::json!({
            "success": false,
            "message": "top-level",
            "error": { "message": "nested" }
        }));
        assert_eq!(env.failure_message(), "nested");
    }

    #[test]
    fn top_level_message_is_second_choice() {
        let env = envelope(serde_json::json!({
            "success": false,
            "message": "top-level"
        }));
        assert_eq!(env.failure_message(), "top-level");
    }

    #[test]
    fn fallback_message_when_server_says_nothing() {
        let env = envelope(serde_json::json!({ "success": false }));
        assert_eq!(env.failure_message(), FALLBACK_MESSAGE);
    }

    #[test]
    fn nested_error_without_message_falls_through() {
        let env = envelope(serde_json::json!({
            "success": false,
            "message": "top-level",
            "error": {}
        }));
        assert_eq!(env.failure_message(), "top-level");
    }
}
