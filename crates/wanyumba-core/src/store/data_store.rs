// ── Central reactive data store ──
//
// One state container per domain entity, plus the scraper status sub-tree
// fed by the push channel. The store is constructed once at process start,
// injected by reference into consumers, and never torn down during the
// process lifetime -- there is no module-level global.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use super::container::EntityContainer;
use super::ContainerSnapshot;
use crate::model::{AdminUser, Listing, Professional, Property, Role, SiteStatus};

/// Scraper status sub-tree: site key (lower case) → last status, or `None`
/// when the server reported the site as offline/unknown.
pub type ScraperStatusMap = HashMap<String, Option<SiteStatus>>;

/// Central reactive store for the admin console.
pub struct DataStore {
    pub(crate) roles: EntityContainer<Role>,
    pub(crate) users: EntityContainer<AdminUser>,
    pub(crate) properties: EntityContainer<Property>,
    pub(crate) listings: EntityContainer<Listing>,
    pub(crate) professionals: EntityContainer<Professional>,
    scraper: watch::Sender<Arc<ScraperStatusMap>>,
    last_push_event: watch::Sender<Option<DateTime<Utc>>>,
}

impl DataStore {
    pub fn new() -> Self {
        let (scraper, _) = watch::channel(Arc::new(ScraperStatusMap::new()));
        let (last_push_event, _) = watch::channel(None);

        Self {
            roles: EntityContainer::new(),
            users: EntityContainer::new(),
            properties: EntityContainer::new(),
            listings: EntityContainer::new(),
            professionals: EntityContainer::new(),
            scraper,
            last_push_event,
        }
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    pub fn roles_snapshot(&self) -> ContainerSnapshot<Role> {
        self.roles.snapshot()
    }

    pub fn users_snapshot(&self) -> ContainerSnapshot<AdminUser> {
        self.users.snapshot()
    }

    pub fn properties_snapshot(&self) -> ContainerSnapshot<Property> {
        self.properties.snapshot()
    }

    pub fn listings_snapshot(&self) -> ContainerSnapshot<Listing> {
        self.listings.snapshot()
    }

    pub fn professionals_snapshot(&self) -> ContainerSnapshot<Professional> {
        self.professionals.snapshot()
    }

    pub fn scraper_status(&self) -> Arc<ScraperStatusMap> {
        self.scraper.borrow().clone()
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe_roles(&self) -> watch::Receiver<ContainerSnapshot<Role>> {
        self.roles.subscribe()
    }

    pub fn subscribe_users(&self) -> watch::Receiver<ContainerSnapshot<AdminUser>> {
        self.users.subscribe()
    }

    pub fn subscribe_properties(&self) -> watch::Receiver<ContainerSnapshot<Property>> {
        self.properties.subscribe()
    }

    pub fn subscribe_listings(&self) -> watch::Receiver<ContainerSnapshot<Listing>> {
        self.listings.subscribe()
    }

    pub fn subscribe_professionals(&self) -> watch::Receiver<ContainerSnapshot<Professional>> {
        self.professionals.subscribe()
    }

    pub fn subscribe_scraper_status(&self) -> watch::Receiver<Arc<ScraperStatusMap>> {
        self.scraper.subscribe()
    }

    // ── Direct setters ───────────────────────────────────────────────
    //
    // These bypass request lifecycle flags entirely; they exist for
    // externally-sourced updates where no request is in flight.

    pub fn set_roles(&self, roles: Vec<Role>) {
        self.roles.replace(roles);
    }

    pub fn clear_roles(&self) {
        self.roles.clear();
    }

    pub fn set_users(&self, users: Vec<AdminUser>) {
        self.users.replace(users);
    }

    pub fn clear_users(&self) {
        self.users.clear();
    }

    pub fn set_properties(&self, properties: Vec<Property>) {
        self.properties.replace(properties);
    }

    pub fn clear_properties(&self) {
        self.properties.clear();
    }

    pub fn set_listings(&self, listings: Vec<Listing>) {
        self.listings.replace(listings);
    }

    pub fn clear_listings(&self) {
        self.listings.clear();
    }

    pub fn set_professionals(&self, professionals: Vec<Professional>) {
        self.professionals.replace(professionals);
    }

    pub fn clear_professionals(&self) {
        self.professionals.clear();
    }

    // ── Scraper status sub-tree ──────────────────────────────────────

    /// Update one site's status. The key is expected lower-cased -- the
    /// push channel boundary normalizes it before the message gets here.
    pub fn set_site_status(&self, site: String, status: SiteStatus) {
        self.scraper.send_modify(|map| {
            Arc::make_mut(map).insert(site, Some(status));
        });
    }

    /// Replace the entire scraper sub-tree at once (bulk resync).
    pub fn replace_scraper_status(&self, sites: ScraperStatusMap) {
        self.scraper.send_modify(|map| *map = Arc::new(sites));
    }

    // ── Metadata ─────────────────────────────────────────────────────

    /// Record that a push message was applied.
    pub fn mark_push_event(&self) {
        let _ = self.last_push_event.send(Some(Utc::now()));
    }

    pub fn last_push_event(&self) -> Option<DateTime<Utc>> {
        *self.last_push_event.borrow()
    }
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn status(phase: &str) -> SiteStatus {
        serde_json::from_value(serde_json::json!({ "phase": phase })).unwrap()
    }

    #[test]
    fn set_site_status_updates_one_key() {
        let store = DataStore::new();
        store.set_site_status("zillow".into(), status("running"));
        store.set_site_status("trulia".into(), status("idle"));

        let map = store.scraper_status();
        assert_eq!(map.len(), 2);
        assert_eq!(
            map.get("zillow").unwrap().as_ref().unwrap().phase.as_deref(),
            Some("running")
        );
    }

    #[test]
    fn replace_scraper_status_is_wholesale() {
        let store = DataStore::new();
        store.set_site_status("zillow".into(), status("running"));

        let mut resync = ScraperStatusMap::new();
        resync.insert("trulia".into(), Some(status("idle")));
        resync.insert("zoopla".into(), None);
        store.replace_scraper_status(resync);

        let map = store.scraper_status();
        assert_eq!(map.len(), 2);
        assert!(!map.contains_key("zillow"));
        assert!(map.get("zoopla").unwrap().is_none());
    }

    #[test]
    fn push_event_marker_advances() {
        let store = DataStore::new();
        assert!(store.last_push_event().is_none());

        store.mark_push_event();
        assert!(store.last_push_event().is_some());
    }
}
