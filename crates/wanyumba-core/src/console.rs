// ── Console abstraction ──
//
// Lifecycle owner for one admin-console session: holds the DataStore and
// the API client, activates the push channel and its bridge task, and
// drives the request lifecycle of every state container.

use std::sync::Arc;

use secrecy::SecretString;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use url::Url;

use wanyumba_api::{ApiClient, PushHandle, ReconnectConfig, TokenStore, TransportConfig};

use crate::bridge::run_bridge;
use crate::config::ConsoleConfig;
use crate::error::CoreError;
use crate::fetch;
use crate::model::{NewRole, ReviewDecision, Role};
use crate::store::DataStore;

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ConsoleInner>`. Created once at process
/// start; the store it owns lives for the whole process.
#[derive(Clone)]
pub struct Console {
    inner: Arc<ConsoleInner>,
}

struct ConsoleInner {
    config: ConsoleConfig,
    store: Arc<DataStore>,
    client: ApiClient,
    cancel: CancellationToken,
    push: Mutex<Option<PushHandle>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Console {
    /// Create a new console. Does NOT open the push channel -- call
    /// [`connect()`](Self::connect) for that; HTTP calls work immediately.
    pub fn new(config: ConsoleConfig, tokens: Arc<dyn TokenStore>) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            timeout: config.timeout,
            cookie_jar: None,
        }
        .with_cookie_jar();
        let client = ApiClient::new(config.base_url.clone(), tokens, &transport)?;

        Ok(Self {
            inner: Arc::new(ConsoleInner {
                config,
                store: Arc::new(DataStore::new()),
                client,
                cancel: CancellationToken::new(),
                push: Mutex::new(None),
                tasks: Mutex::new(Vec::new()),
            }),
        })
    }

    /// Access the console configuration.
    pub fn config(&self) -> &ConsoleConfig {
        &self.inner.config
    }

    /// Access the underlying DataStore.
    pub fn store(&self) -> &Arc<DataStore> {
        &self.inner.store
    }

    // ── Push channel lifecycle ───────────────────────────────────────

    /// Activate the push channel and spawn the bridge task.
    ///
    /// No-op when the channel is disabled in config. The channel
    /// subscribes to the scraping-status feed once per established
    /// connection; decoded messages flow into the store through the
    /// bridge without distinguishing push from pull for consumers.
    pub async fn connect(&self) -> Result<(), CoreError> {
        if !self.inner.config.push_enabled {
            debug!("push channel disabled in config");
            return Ok(());
        }

        let ws_url = self.push_url()?;
        let bearer = self.inner.client.tokens().load();

        let channel_cancel = self.inner.cancel.child_token();
        let handle = PushHandle::connect(
            ws_url,
            ReconnectConfig::default(),
            channel_cancel.clone(),
            bearer,
        );

        let messages = handle.subscribe();
        let store = Arc::clone(&self.inner.store);
        self.inner
            .tasks
            .lock()
            .await
            .push(tokio::spawn(run_bridge(store, messages, channel_cancel)));

        *self.inner.push.lock().await = Some(handle);
        info!("push channel activated");
        Ok(())
    }

    /// Tear down the push channel and all background tasks.
    pub async fn disconnect(&self) {
        self.inner.cancel.cancel();

        if let Some(handle) = self.inner.push.lock().await.take() {
            handle.shutdown();
        }

        let mut tasks = self.inner.tasks.lock().await;
        for task in tasks.drain(..) {
            let _ = task.await;
        }

        debug!("console disconnected");
    }

    /// Derive the push channel URL from the API base URL.
    fn push_url(&self) -> Result<Url, CoreError> {
        let base = &self.inner.config.base_url;
        let scheme = if base.scheme() == "https" { "wss" } else { "ws" };
        let host = base.host_str().unwrap_or("localhost");
        let path = &self.inner.config.ws_path;
        let url_str = match base.port() {
            Some(p) => format!("{scheme}://{host}:{p}{path}"),
            None => format!("{scheme}://{host}{path}"),
        };
        url_str.parse().map_err(|e| CoreError::Config {
            message: format!("invalid push channel URL {url_str}: {e}"),
        })
    }

    // ── Authentication ───────────────────────────────────────────────

    /// Log in and persist the issued token for subsequent sessions.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<(), CoreError> {
        self.inner.client.login(email, password).await?;
        Ok(())
    }

    /// Log out and clear the persisted token.
    pub async fn logout(&self) -> Result<(), CoreError> {
        self.inner.client.logout().await?;
        Ok(())
    }

    // ── Refresh operations ───────────────────────────────────────────
    //
    // Each drives the full container lifecycle: pending on dispatch, then
    // fulfilled or rejected on resolution. Failures land in the
    // container's error field and are never propagated further -- views
    // render them; retrying is a fresh user-triggered dispatch.

    pub async fn refresh_roles(&self) {
        let store = &self.inner.store;
        store.roles.begin();
        match fetch::fetch_roles(&self.inner.client).await {
            Ok(items) => store.roles.complete(items),
            Err(e) => store.roles.fail(e.user_message()),
        }
    }

    pub async fn refresh_users(&self) {
        let store = &self.inner.store;
        store.users.begin();
        match fetch::fetch_users(&self.inner.client).await {
            Ok(items) => store.users.complete(items),
            Err(e) => store.users.fail(e.user_message()),
        }
    }

    pub async fn refresh_properties(&self) {
        let store = &self.inner.store;
        store.properties.begin();
        match fetch::fetch_properties(&self.inner.client).await {
            Ok(items) => store.properties.complete(items),
            Err(e) => store.properties.fail(e.user_message()),
        }
    }

    pub async fn refresh_listings(&self) {
        let store = &self.inner.store;
        store.listings.begin();
        match fetch::fetch_listings(&self.inner.client).await {
            Ok(items) => store.listings.complete(items),
            Err(e) => store.listings.fail(e.user_message()),
        }
    }

    pub async fn refresh_professionals(&self) {
        let store = &self.inner.store;
        store.professionals.begin();
        match fetch::fetch_professionals(&self.inner.client).await {
            Ok(items) => store.professionals.complete(items),
            Err(e) => store.professionals.fail(e.user_message()),
        }
    }

    /// Refresh every container concurrently.
    pub async fn refresh_all(&self) {
        tokio::join!(
            self.refresh_roles(),
            self.refresh_users(),
            self.refresh_properties(),
            self.refresh_listings(),
            self.refresh_professionals(),
        );
    }

    // ── Mutations ────────────────────────────────────────────────────
    //
    // Command-shaped operations: failures propagate to the caller, and a
    // successful mutation re-fetches the affected container so the store
    // reflects the server's canonical state.

    /// Create a role, then re-fetch the roles container.
    pub async fn create_role(&self, new_role: &NewRole) -> Result<Role, CoreError> {
        let role = fetch::create_role(&self.inner.client, new_role).await?;
        self.refresh_roles().await;
        Ok(role)
    }

    /// Delete a role by id, then re-fetch the roles container.
    pub async fn delete_role(&self, id: &str) -> Result<(), CoreError> {
        fetch::delete_role(&self.inner.client, id).await?;
        self.refresh_roles().await;
        Ok(())
    }

    /// Approve or reject a professional profile, then re-fetch.
    pub async fn review_professional(
        &self,
        id: &str,
        decision: ReviewDecision,
    ) -> Result<(), CoreError> {
        fetch::review_professional(&self.inner.client, id, decision).await?;
        self.refresh_professionals().await;
        Ok(())
    }

    /// Kick off a scraper run for one site. Progress arrives on the push
    /// channel, so there is nothing to re-fetch here.
    pub async fn trigger_scrape(&self, site: &str) -> Result<(), CoreError> {
        fetch::trigger_scrape(&self.inner.client, site).await?;
        Ok(())
    }
}
