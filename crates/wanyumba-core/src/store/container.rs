// ── Generic state container ──
//
// One container per domain entity collection. Holds the last-known server
// data plus request lifecycle flags, and broadcasts whole snapshots to
// subscribers via a `watch` channel. `send_modify` applies each action
// atomically, one at a time -- racing actions resolve last-write-wins with
// no sequencing guards.

use std::sync::Arc;

use tokio::sync::watch;

/// Point-in-time view of a state container.
#[derive(Debug)]
pub struct ContainerSnapshot<T> {
    /// Last-known server data. Replaced wholesale on every successful
    /// fetch -- never merged with prior items.
    pub items: Arc<Vec<T>>,

    /// True only between request dispatch and its resolution.
    pub loading: bool,

    /// Set only by a failed resolution; cleared by the next successful
    /// fetch or an explicit clear.
    pub error: Option<String>,
}

impl<T> Clone for ContainerSnapshot<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
            loading: self.loading,
            error: self.error.clone(),
        }
    }
}

impl<T> ContainerSnapshot<T> {
    fn idle() -> Self {
        Self {
            items: Arc::new(Vec::new()),
            loading: false,
            error: None,
        }
    }
}

/// Reactive container for a single entity collection.
///
/// The three lifecycle reducers (`begin`, `complete`, `fail`) mirror the
/// request state machine `Idle → Pending → (Success | Failure)`. The
/// direct setters (`replace`, `clear`) bypass lifecycle flags entirely and
/// exist for externally-sourced updates where no request is in flight.
pub(crate) struct EntityContainer<T> {
    state: watch::Sender<ContainerSnapshot<T>>,
}

impl<T: Send + Sync + 'static> EntityContainer<T> {
    pub(crate) fn new() -> Self {
        let (state, _) = watch::channel(ContainerSnapshot::idle());
        Self { state }
    }

    /// Request dispatched: mark loading, clear any stale error.
    /// Items are left untouched until a terminal action lands.
    pub(crate) fn begin(&self) {
        self.state.send_modify(|snap| {
            snap.loading = true;
            snap.error = None;
        });
    }

    /// Successful resolution: replace items wholesale.
    pub(crate) fn complete(&self, items: Vec<T>) {
        self.state.send_modify(|snap| {
            snap.loading = false;
            snap.error = None;
            snap.items = Arc::new(items);
        });
    }

    /// Failed resolution: record the message, keep the stale items
    /// (stale-but-present policy).
    pub(crate) fn fail(&self, message: impl Into<String>) {
        let message = message.into();
        self.state.send_modify(|snap| {
            snap.loading = false;
            snap.error = Some(message);
        });
    }

    /// Direct setter: replace items without touching lifecycle flags.
    pub(crate) fn replace(&self, items: Vec<T>) {
        self.state.send_modify(|snap| {
            snap.items = Arc::new(items);
        });
    }

    /// Direct setter: drop items and error. Lifecycle flags untouched.
    pub(crate) fn clear(&self) {
        self.state.send_modify(|snap| {
            snap.items = Arc::new(Vec::new());
            snap.error = None;
        });
    }

    /// Get the current snapshot (cheap `Arc` clones).
    pub(crate) fn snapshot(&self) -> ContainerSnapshot<T> {
        self.state.borrow().clone()
    }

    /// Subscribe to snapshot changes via a `watch::Receiver`.
    pub(crate) fn subscribe(&self) -> watch::Receiver<ContainerSnapshot<T>> {
        self.state.subscribe()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn begin_sets_loading_and_clears_error() {
        let container: EntityContainer<String> = EntityContainer::new();
        container.fail("previous failure");

        container.begin();

        let snap = container.snapshot();
        assert!(snap.loading);
        assert!(snap.error.is_none());
        assert!(snap.items.is_empty());
    }

    #[test]
    fn complete_replaces_items_wholesale() {
        let container: EntityContainer<String> = EntityContainer::new();
        container.complete(vec!["a".into(), "b".into()]);
        container.begin();
        container.complete(vec!["c".into()]);

        let snap = container.snapshot();
        assert!(!snap.loading);
        assert!(snap.error.is_none());
        // Full overwrite: the prior "a"/"b" must not survive.
        assert_eq!(*snap.items, vec!["c".to_owned()]);
    }

    #[test]
    fn fail_keeps_stale_items() {
        let container: EntityContainer<String> = EntityContainer::new();
        container.complete(vec!["a".into()]);
        container.begin();
        container.fail("boom");

        let snap = container.snapshot();
        assert!(!snap.loading);
        assert_eq!(snap.error.as_deref(), Some("boom"));
        assert_eq!(*snap.items, vec!["a".to_owned()]);
    }

    #[test]
    fn error_is_cleared_by_next_success() {
        let container: EntityContainer<String> = EntityContainer::new();
        container.fail("boom");
        container.begin();
        container.complete(vec!["a".into()]);

        assert!(container.snapshot().error.is_none());
    }

    #[test]
    fn replace_bypasses_lifecycle_flags() {
        let container: EntityContainer<String> = EntityContainer::new();
        container.begin();

        container.replace(vec!["pushed".into()]);

        let snap = container.snapshot();
        // Still loading: the in-flight request's lifecycle is untouched.
        assert!(snap.loading);
        assert_eq!(*snap.items, vec!["pushed".to_owned()]);
    }

    #[test]
    fn clear_drops_items_and_error() {
        let container: EntityContainer<String> = EntityContainer::new();
        container.complete(vec!["a".into()]);
        container.fail("boom");

        container.clear();

        let snap = container.snapshot();
        assert!(snap.items.is_empty());
        assert!(snap.error.is_none());
    }

    #[test]
    fn later_resolution_wins_over_earlier_dispatch() {
        // Two overlapping fetches: the second dispatched resolves first,
        // then the first dispatched resolves. No sequencing guards exist,
        // so the later resolution wins.
        let container: EntityContainer<String> = EntityContainer::new();

        container.begin(); // fetch A dispatched
        container.begin(); // fetch B dispatched
        container.complete(vec!["from-b".into()]); // B resolves first
        container.complete(vec!["from-a".into()]); // A resolves last

        assert_eq!(*container.snapshot().items, vec!["from-a".to_owned()]);
    }

    #[test]
    fn subscribers_see_snapshot_changes() {
        let container: EntityContainer<String> = EntityContainer::new();
        let rx = container.subscribe();

        container.complete(vec!["a".into()]);

        assert_eq!(*rx.borrow().items, vec!["a".to_owned()]);
        assert!(rx.has_changed().unwrap());
    }
}
