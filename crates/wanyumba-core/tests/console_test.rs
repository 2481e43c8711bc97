#![allow(clippy::unwrap_used)]
// Integration tests for the Console request lifecycle using wiremock.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wanyumba_api::{MemoryTokenStore, TokenStore};
use wanyumba_core::{Console, ConsoleConfig};

// ── Helpers ─────────────────────────────────────────────────────────

fn console_for(server: &MockServer, tokens: Arc<MemoryTokenStore>) -> Console {
    let config = ConsoleConfig {
        base_url: format!("{}/api/v1", server.uri()).parse().unwrap(),
        push_enabled: false,
        ..ConsoleConfig::default()
    };
    Console::new(config, tokens as Arc<dyn TokenStore>).unwrap()
}

async fn setup() -> (MockServer, Console) {
    let server = MockServer::start().await;
    let console = console_for(&server, Arc::new(MemoryTokenStore::with_token("tok")));
    (server, console)
}

fn roles_envelope(ids: &[&str]) -> serde_json::Value {
    let roles: Vec<_> = ids
        .iter()
        .map(|id| json!({ "id": id, "name": format!("role-{id}"), "permissions": [] }))
        .collect();
    json!({ "success": true, "data": { "roles": roles } })
}

// ── Fetch lifecycle ─────────────────────────────────────────────────

#[tokio::test]
async fn refresh_roles_fills_the_container() {
    let (server, console) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/roles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(roles_envelope(&["r1", "r2"])))
        .mount(&server)
        .await;

    console.refresh_roles().await;

    let snap = console.store().roles_snapshot();
    assert!(!snap.loading);
    assert!(snap.error.is_none());
    assert_eq!(snap.items.len(), 2);
    assert_eq!(snap.items[0].id, "r1");
}

#[tokio::test]
async fn loading_is_true_while_the_request_is_in_flight() {
    let (server, console) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/roles"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(roles_envelope(&["r1"]))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;

    let mut rx = console.store().subscribe_roles();
    let refresh = tokio::spawn({
        let console = console.clone();
        async move { console.refresh_roles().await }
    });

    // First change is the pending dispatch: loading, no error.
    rx.changed().await.unwrap();
    {
        let snap = rx.borrow_and_update();
        assert!(snap.loading);
        assert!(snap.error.is_none());
        assert!(snap.items.is_empty());
    }

    // Second change is the terminal action.
    rx.changed().await.unwrap();
    {
        let snap = rx.borrow_and_update();
        assert!(!snap.loading);
        assert_eq!(snap.items.len(), 1);
    }

    refresh.await.unwrap();
}

#[tokio::test]
async fn rejected_fetch_keeps_stale_items_and_records_the_message() {
    let (server, console) = setup().await;

    // First call succeeds, second reports a logical failure.
    Mock::given(method("GET"))
        .and(path("/api/v1/roles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(roles_envelope(&["r1"])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/roles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "role service unavailable"
        })))
        .mount(&server)
        .await;

    console.refresh_roles().await;
    console.refresh_roles().await;

    let snap = console.store().roles_snapshot();
    assert!(!snap.loading);
    assert_eq!(snap.error.as_deref(), Some("role service unavailable"));
    // Stale-but-present: the first fetch's data survives the failure.
    assert_eq!(snap.items.len(), 1);
    assert_eq!(snap.items[0].id, "r1");
}

#[tokio::test]
async fn session_expiry_clears_the_token_and_lands_in_the_error_field() {
    let server = MockServer::start().await;
    let tokens = Arc::new(MemoryTokenStore::with_token("stale"));
    let console = console_for(&server, Arc::clone(&tokens));

    Mock::given(method("GET"))
        .and(path("/api/v1/roles"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    console.refresh_roles().await;

    let snap = console.store().roles_snapshot();
    assert_eq!(
        snap.error.as_deref(),
        Some("Session expired -- re-authentication required")
    );
    assert!(tokens.load().is_none(), "401 should clear the stored token");
}

// ── Ordering ────────────────────────────────────────────────────────

#[tokio::test]
async fn overlapping_fetches_resolve_last_write_wins() {
    let (server, console) = setup().await;

    // One of the two concurrent calls is held back; whichever resolves
    // last must win. There are no sequencing guards by design.
    Mock::given(method("GET"))
        .and(path("/api/v1/roles"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(roles_envelope(&["slow"]))
                .set_delay(Duration::from_millis(400)),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/roles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(roles_envelope(&["fast"])))
        .mount(&server)
        .await;

    tokio::join!(console.refresh_roles(), console.refresh_roles());

    let snap = console.store().roles_snapshot();
    assert_eq!(snap.items.len(), 1);
    assert_eq!(
        snap.items[0].id, "slow",
        "the later-resolved response must overwrite the earlier one"
    );
    assert!(!snap.loading);
}

// ── Other containers ────────────────────────────────────────────────

#[tokio::test]
async fn refresh_all_fills_every_container() {
    let (server, console) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/roles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(roles_envelope(&["r1"])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "users": [{ "id": "u1", "email": "ops@wanyumba.com" }] }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/properties"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "properties": [{
                "id": "p1",
                "title": "3BR apartment, Kilimani",
                "status": "published",
                "images": []
            }] }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/listings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "listings": [{ "id": "l1", "sourceSite": "zillow" }] }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/professionals"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "professionals": [{ "id": "pro1", "name": "A. Otieno" }] }
        })))
        .mount(&server)
        .await;

    console.refresh_all().await;

    let store = console.store();
    assert_eq!(store.roles_snapshot().items.len(), 1);
    assert_eq!(store.users_snapshot().items.len(), 1);
    assert_eq!(store.properties_snapshot().items.len(), 1);
    assert_eq!(store.listings_snapshot().items.len(), 1);
    assert_eq!(store.professionals_snapshot().items.len(), 1);
}

// ── Mutations ───────────────────────────────────────────────────────

#[tokio::test]
async fn create_role_posts_then_refetches() {
    let (server, console) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/roles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "role": { "id": "r9", "name": "auditor", "permissions": [] } }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/roles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(roles_envelope(&["r1", "r9"])))
        .expect(1)
        .mount(&server)
        .await;

    let new_role = wanyumba_core::model::NewRole {
        name: "auditor".into(),
        description: None,
        permissions: vec!["listings:read".into()],
    };
    let created = console.create_role(&new_role).await.unwrap();

    assert_eq!(created.id, "r9");
    assert_eq!(console.store().roles_snapshot().items.len(), 2);
}

#[tokio::test]
async fn rejected_mutation_surfaces_the_server_message() {
    let (server, console) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1/roles/r1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": { "message": "role is still assigned to 3 users" }
        })))
        .mount(&server)
        .await;

    let result = console.delete_role("r1").await;

    match result {
        Err(wanyumba_core::CoreError::Rejected { ref message }) => {
            assert_eq!(message, "role is still assigned to 3 users");
        }
        other => panic!("expected Rejected, got: {other:?}"),
    }
}
