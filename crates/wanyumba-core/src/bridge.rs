// ── Push channel bridge ──
//
// Routes decoded push messages into the matching store sub-tree. The
// bridge is passive: it performs no requests of its own, never blocks,
// and never fails observably. Undecodable frames never reach it -- the
// channel boundary drops them before this task sees anything.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use wanyumba_api::PushMessage;

use crate::store::DataStore;

/// Consume decoded push messages until the channel closes or the token
/// is cancelled.
pub(crate) async fn run_bridge(
    store: Arc<DataStore>,
    mut messages: broadcast::Receiver<Arc<PushMessage>>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = messages.recv() => {
                match result {
                    Ok(msg) => apply(&store, &msg),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "push bridge: receiver lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!("push bridge exiting");
}

/// Dispatch one decoded message into the store.
fn apply(store: &DataStore, msg: &PushMessage) {
    match msg {
        PushMessage::ScrapingStatus { site, status } => {
            store.set_site_status(site.clone(), status.clone());
        }
        PushMessage::FullStatus(sites) => {
            store.replace_scraper_status(sites.clone());
        }
    }
    store.mark_push_event();
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::ScraperStatusMap;
    use wanyumba_api::SiteStatus;

    fn status(phase: &str) -> SiteStatus {
        serde_json::from_value(serde_json::json!({ "phase": phase })).unwrap()
    }

    #[test]
    fn scraping_status_updates_one_site() {
        let store = DataStore::new();

        apply(
            &store,
            &PushMessage::ScrapingStatus {
                site: "zillow".into(),
                status: status("running"),
            },
        );

        let map = store.scraper_status();
        assert_eq!(
            map.get("zillow").unwrap().as_ref().unwrap().phase.as_deref(),
            Some("running")
        );
        assert!(store.last_push_event().is_some());
    }

    #[test]
    fn full_status_replaces_the_sub_tree() {
        let store = DataStore::new();
        store.set_site_status("zillow".into(), status("running"));

        let mut sites = ScraperStatusMap::new();
        sites.insert("trulia".into(), Some(status("idle")));
        sites.insert("zoopla".into(), None);
        apply(&store, &PushMessage::FullStatus(sites));

        let map = store.scraper_status();
        assert_eq!(map.len(), 2);
        assert!(!map.contains_key("zillow"));
    }

    #[tokio::test]
    async fn bridge_task_applies_messages_and_stops_on_cancel() {
        let store = Arc::new(DataStore::new());
        let (tx, rx) = broadcast::channel(16);
        let cancel = CancellationToken::new();

        let task = tokio::spawn(run_bridge(Arc::clone(&store), rx, cancel.clone()));

        let mut watch_rx = store.subscribe_scraper_status();
        tx.send(Arc::new(PushMessage::ScrapingStatus {
            site: "zillow".into(),
            status: status("running"),
        }))
        .unwrap();

        watch_rx.changed().await.unwrap();
        assert!(store.scraper_status().contains_key("zillow"));

        cancel.cancel();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn bridge_task_stops_when_channel_closes() {
        let store = Arc::new(DataStore::new());
        let (tx, rx) = broadcast::channel(16);
        let cancel = CancellationToken::new();

        let task = tokio::spawn(run_bridge(store, rx, cancel));
        drop(tx);

        task.await.unwrap();
    }
}
