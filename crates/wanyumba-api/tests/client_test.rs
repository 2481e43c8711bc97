#![allow(clippy::unwrap_used)]
// Integration tests for `ApiClient` using wiremock.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wanyumba_api::{ApiClient, Error, MemoryTokenStore, TokenStore, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

fn base_url(server: &MockServer) -> Url {
    Url::parse(&format!("{}/api/v1", server.uri())).unwrap()
}

async fn setup_with_token(token: &str) -> (MockServer, ApiClient, Arc<MemoryTokenStore>) {
    let server = MockServer::start().await;
    let tokens = Arc::new(MemoryTokenStore::with_token(token));
    let client = ApiClient::new(
        base_url(&server),
        Arc::clone(&tokens) as Arc<dyn TokenStore>,
        &TransportConfig::default(),
    )
    .unwrap();
    (server, client, tokens)
}

#[derive(Debug, Deserialize)]
struct Role {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct RolesPayload {
    roles: Vec<Role>,
}

// ── Envelope unwrapping ─────────────────────────────────────────────

#[tokio::test]
async fn test_get_unwraps_envelope_data() {
    let (server, client, _tokens) = setup_with_token("tok-1").await;

    let envelope = json!({
        "success": true,
        "data": {
            "roles": [
                { "id": "r1", "name": "admin", "permissions": ["users:write"] },
                { "id": "r2", "name": "agent", "permissions": [] }
            ]
        }
    });

    Mock::given(method("GET"))
        .and(path("/api/v1/roles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&envelope))
        .mount(&server)
        .await;

    let payload: RolesPayload = client.get("roles").await.unwrap();

    assert_eq!(payload.roles.len(), 2);
    assert_eq!(payload.roles[0].id, "r1");
    assert_eq!(payload.roles[1].name, "agent");
}

#[tokio::test]
async fn test_success_without_data_is_a_failure() {
    let (server, client, _tokens) = setup_with_token("tok-1").await;

    Mock::given(method("GET"))
        .and(path("/api/v1/roles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .mount(&server)
        .await;

    let result = client.get::<RolesPayload>("roles").await;

    match result {
        Err(Error::Api { ref message }) => assert_eq!(message, "Something went wrong"),
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_failure_message_prefers_nested_error() {
    let (server, client, _tokens) = setup_with_token("tok-1").await;

    let envelope = json!({
        "success": false,
        "message": "outer message",
        "error": { "message": "role name already taken" }
    });

    Mock::given(method("POST"))
        .and(path("/api/v1/roles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&envelope))
        .mount(&server)
        .await;

    let result = client
        .post::<serde_json::Value>("roles", &json!({ "name": "admin" }))
        .await;

    match result {
        Err(Error::Api { ref message }) => assert_eq!(message, "role name already taken"),
        other => panic!("expected Api error, got: {other:?}"),
    }
}

// ── Session expiry (401) ────────────────────────────────────────────

#[tokio::test]
async fn test_401_clears_stored_token_and_fails_the_call() {
    let (server, client, tokens) = setup_with_token("stale-token").await;

    Mock::given(method("GET"))
        .and(path("/api/v1/roles"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client.get::<RolesPayload>("roles").await;

    // The caller still receives the failure...
    assert!(
        matches!(result, Err(Error::SessionExpired)),
        "expected SessionExpired, got: {result:?}"
    );
    // ...and the side effect already happened process-wide.
    assert!(tokens.load().is_none(), "401 should clear the stored token");
}

// ── Credential attachment ───────────────────────────────────────────

#[tokio::test]
async fn test_bearer_token_attached_when_no_cookie() {
    let (server, client, _tokens) = setup_with_token("tok-abc").await;

    let envelope = json!({ "success": true, "data": { "roles": [] } });

    Mock::given(method("GET"))
        .and(path("/api/v1/roles"))
        .and(header("authorization", "Bearer tok-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&envelope))
        .expect(1)
        .mount(&server)
        .await;

    let payload: RolesPayload = client.get("roles").await.unwrap();
    assert!(payload.roles.is_empty());
}

#[tokio::test]
async fn test_session_cookie_takes_priority_over_bearer() {
    let (server, client, _tokens) = setup_with_token("tok-abc").await;

    // Login responds with a session cookie and a fresh token.
    let login_envelope = json!({ "success": true, "data": { "token": "tok-fresh" } });
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(&login_envelope)
                .insert_header("set-cookie", "session=s3cret; Path=/"),
        )
        .mount(&server)
        .await;

    let password: secrecy::SecretString = "hunter2".to_string().into();
    client.login("ops@wanyumba.com", &password).await.unwrap();

    // With a cookie in the jar, no Authorization header may be sent.
    // The stricter mock is mounted first and must never match.
    let envelope = json!({ "success": true, "data": { "roles": [] } });
    Mock::given(method("GET"))
        .and(path("/api/v1/roles"))
        .and(wiremock::matchers::header_exists("authorization"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/roles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&envelope))
        .expect(1)
        .mount(&server)
        .await;

    let payload: RolesPayload = client.get("roles").await.unwrap();
    assert!(payload.roles.is_empty());
}

// ── Timeout ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_timeout_resolves_as_timeout_failure() {
    let server = MockServer::start().await;
    let tokens = Arc::new(MemoryTokenStore::new());
    let transport = TransportConfig {
        timeout: Duration::from_secs(1),
        ..TransportConfig::default()
    };
    let client = ApiClient::new(
        base_url(&server),
        tokens as Arc<dyn TokenStore>,
        &transport,
    )
    .unwrap();

    Mock::given(method("GET"))
        .and(path("/api/v1/roles"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "data": { "roles": [] } }))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let result = client.get::<RolesPayload>("roles").await;

    match result {
        Err(Error::Timeout { timeout_secs }) => assert_eq!(timeout_secs, 1),
        other => panic!("expected Timeout error, got: {other:?}"),
    }
}

// ── Logout ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_logout_clears_token_even_when_session_already_expired() {
    let (server, client, tokens) = setup_with_token("tok-old").await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/logout"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    client.logout().await.unwrap();
    assert!(tokens.load().is_none());
}
