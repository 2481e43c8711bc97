// ── Async request handlers ──
//
// One handler per (entity-set, verb). Each wraps exactly one remote call,
// extracts its payload field from the response envelope, and resolves to a
// success payload or a typed failure. Handlers hold no state and never
// retry -- re-invocation policy belongs to the caller.

use serde::Deserialize;
use serde_json::json;

use wanyumba_api::{ApiClient, Error};

use crate::model::{
    AdminUser, Listing, NewRole, Professional, Property, ReviewDecision, Role,
};

// ── Fetch verbs ─────────────────────────────────────────────────────

#[derive(Deserialize)]
struct RolesPayload {
    roles: Vec<Role>,
}

pub(crate) async fn fetch_roles(client: &ApiClient) -> Result<Vec<Role>, Error> {
    let payload: RolesPayload = client.get("roles").await?;
    Ok(payload.roles)
}

#[derive(Deserialize)]
struct UsersPayload {
    users: Vec<AdminUser>,
}

pub(crate) async fn fetch_users(client: &ApiClient) -> Result<Vec<AdminUser>, Error> {
    let payload: UsersPayload = client.get("users").await?;
    Ok(payload.users)
}

#[derive(Deserialize)]
struct PropertiesPayload {
    properties: Vec<Property>,
}

pub(crate) async fn fetch_properties(client: &ApiClient) -> Result<Vec<Property>, Error> {
    let payload: PropertiesPayload = client.get("properties").await?;
    Ok(payload.properties)
}

#[derive(Deserialize)]
struct ListingsPayload {
    listings: Vec<Listing>,
}

pub(crate) async fn fetch_listings(client: &ApiClient) -> Result<Vec<Listing>, Error> {
    let payload: ListingsPayload = client.get("listings").await?;
    Ok(payload.listings)
}

#[derive(Deserialize)]
struct ProfessionalsPayload {
    professionals: Vec<Professional>,
}

pub(crate) async fn fetch_professionals(client: &ApiClient) -> Result<Vec<Professional>, Error> {
    let payload: ProfessionalsPayload = client.get("professionals").await?;
    Ok(payload.professionals)
}

// ── Mutating verbs ──────────────────────────────────────────────────

#[derive(Deserialize)]
struct RolePayload {
    role: Role,
}

pub(crate) async fn create_role(client: &ApiClient, new_role: &NewRole) -> Result<Role, Error> {
    let payload: RolePayload = client.post("roles", new_role).await?;
    Ok(payload.role)
}

pub(crate) async fn delete_role(client: &ApiClient, id: &str) -> Result<(), Error> {
    client.delete_unit(&format!("roles/{id}")).await
}

pub(crate) async fn review_professional(
    client: &ApiClient,
    id: &str,
    decision: ReviewDecision,
) -> Result<(), Error> {
    client
        .post_unit(
            &format!("professionals/{id}/review"),
            &json!({ "decision": decision }),
        )
        .await
}

/// Kick off a scraper run for one site. Progress lands on the push
/// channel, not in this response.
pub(crate) async fn trigger_scrape(client: &ApiClient, site: &str) -> Result<(), Error> {
    let site = site.to_lowercase();
    client.post_unit(&format!("scraper/{site}/run"), &json!({})).await
}
