//! Shared, snapshot-based access to the monitor state.
//!
//! Writers (the poller and the action dispatcher) go through
//! [`StateHandle::update`], which runs each mutation as a single
//! `watch::Sender::send_modify` call. Readers get cloned [`MonitorState`]
//! snapshots or a `watch::Receiver` and never mutate shared data.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::store::StateStore;

/// Everything the presentation layer needs to draw one frame.
#[derive(Debug, Clone, Default)]
pub struct MonitorState {
    /// Mirrored sessions and credentials.
    pub store: StateStore,
    /// Message of the last failed poll round; cleared by the next good round.
    pub error: Option<String>,
    /// When the last round that applied data settled.
    pub last_refresh: Option<DateTime<Utc>>,
    /// Whether the poller is currently scheduling rounds.
    pub auto_refresh: bool,
    /// Rounds currently waiting on the backend.
    in_flight: usize,
}

impl MonitorState {
    /// `true` only while at least one poll round is in flight.
    pub fn loading(&self) -> bool {
        self.in_flight > 0
    }

    pub(crate) fn round_started(&mut self) {
        self.in_flight += 1;
    }

    pub(crate) fn round_settled(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }
}

/// Cloneable handle to the single shared [`MonitorState`].
#[derive(Clone)]
pub struct StateHandle {
    tx: Arc<watch::Sender<MonitorState>>,
}

impl Default for StateHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl StateHandle {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(MonitorState::default());
        Self { tx: Arc::new(tx) }
    }

    /// Receiver that is notified after every completed mutation.
    pub fn subscribe(&self) -> watch::Receiver<MonitorState> {
        self.tx.subscribe()
    }

    /// Owned copy of the current state.
    pub fn snapshot(&self) -> MonitorState {
        self.tx.borrow().clone()
    }

    /// Apply `f` as one atomic operation and notify subscribers.
    pub(crate) fn update<R>(&self, f: impl FnOnce(&mut MonitorState) -> R) -> R {
        let mut out = None;
        self.tx.send_modify(|state| out = Some(f(state)));
        // send_modify always runs the closure exactly once.
        match out {
            Some(r) => r,
            None => unreachable!("send_modify did not invoke the closure"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::session;
    use console_core::models::SessionStatus;

    #[test]
    fn test_default_state_not_loading() {
        let handle = StateHandle::new();
        let snap = handle.snapshot();
        assert!(!snap.loading());
        assert!(snap.error.is_none());
        assert!(snap.last_refresh.is_none());
        assert!(snap.store.is_empty());
    }

    #[test]
    fn test_loading_tracks_overlapping_rounds() {
        let handle = StateHandle::new();
        handle.update(|s| s.round_started());
        handle.update(|s| s.round_started());
        assert!(handle.snapshot().loading());

        handle.update(|s| s.round_settled());
        assert!(handle.snapshot().loading());
        handle.update(|s| s.round_settled());
        assert!(!handle.snapshot().loading());

        // Extra settle never underflows.
        handle.update(|s| s.round_settled());
        assert!(!handle.snapshot().loading());
    }

    #[test]
    fn test_snapshot_is_detached_from_later_writes() {
        let handle = StateHandle::new();
        handle.update(|s| {
            s.store
                .replace_sessions(vec![session("s1", SessionStatus::Active, 5)]);
        });
        let before = handle.snapshot();

        handle.update(|s| s.store.mark_expired("s1"));

        assert_eq!(
            before.store.session("s1").unwrap().status,
            SessionStatus::Active
        );
        assert_eq!(
            handle.snapshot().store.session("s1").unwrap().status,
            SessionStatus::Expired
        );
    }

    #[test]
    fn test_update_returns_closure_result() {
        let handle = StateHandle::new();
        let changed = handle.update(|s| s.store.mark_expired("missing"));
        assert!(!changed);
    }

    #[tokio::test]
    async fn test_subscribers_notified_on_update() {
        let handle = StateHandle::new();
        let mut rx = handle.subscribe();
        handle.update(|s| s.error = Some("boom".to_string()));
        rx.changed().await.expect("sender alive");
        assert_eq!(rx.borrow().error.as_deref(), Some("boom"));
    }
}
