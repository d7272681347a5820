//! Scheduled polling of the backend.
//!
//! [`Poller`] owns a tokio task that ticks every refresh interval and spawns
//! one independent *round* per tick. A round fetches sessions and credentials
//! concurrently and folds the results into the shared [`StateHandle`].
//!
//! Rounds are not sequenced: a slow round may settle after a newer one and
//! overwrite it (last-settled-wins). The store's terminal-status guard keeps
//! such a stale round from reviving a terminated session.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use console_core::error::Result;
use console_core::models::{Credential, Session};

use crate::backend::{Backend, Response};
use crate::state::StateHandle;

// ── Public types ──────────────────────────────────────────────────────────────

/// What a single round did to the shared state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundOutcome {
    /// Both fetches produced responses. `false` flags mark a slice left stale
    /// because the backend rejected that request.
    Applied { sessions: bool, credentials: bool },
    /// A transport fault discarded the whole round.
    Failed(String),
}

/// Human-readable error shown while the last round failed.
pub const FETCH_ERROR_MESSAGE: &str = "Failed to fetch session data";

/// Shortest schedule period; matches the `--refresh-interval-ms` floor.
pub const MIN_INTERVAL: Duration = Duration::from_millis(100);

// ── Poller ────────────────────────────────────────────────────────────────────

/// Background poller with explicit `start` / `stop` control.
pub struct Poller<B: Backend> {
    backend: Arc<B>,
    state: StateHandle,
    /// Cancellation handle for the scheduling loop, `None` when stopped.
    schedule: Option<JoinHandle<()>>,
}

impl<B: Backend> Poller<B> {
    pub fn new(backend: Arc<B>, state: StateHandle) -> Self {
        Self {
            backend,
            state,
            schedule: None,
        }
    }

    /// Run one round immediately, then one every `interval`.
    ///
    /// Restarts the schedule when already running. Periods below
    /// [`MIN_INTERVAL`] are raised to it.
    pub fn start(&mut self, interval: Duration) {
        self.stop();

        if interval < MIN_INTERVAL {
            tracing::warn!(
                requested_ms = interval.as_millis() as u64,
                "refresh interval below minimum; clamping"
            );
        }
        let interval = interval.max(MIN_INTERVAL);

        let backend = Arc::clone(&self.backend);
        let state = self.state.clone();
        tracing::info!(interval_ms = interval.as_millis() as u64, "auto-refresh started");

        self.schedule = Some(tokio::spawn(async move {
            let mut ticker = time::interval(interval);
            // A late tick should not trigger a burst of catch-up rounds.
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                // First tick completes immediately.
                ticker.tick().await;
                let backend = Arc::clone(&backend);
                let state = state.clone();
                // Each round settles on its own; stopping the loop never
                // aborts a round already in flight.
                tokio::spawn(async move {
                    run_round(backend.as_ref(), &state).await;
                });
            }
        }));
        self.state.update(|s| s.auto_refresh = true);
    }

    /// Cancel all future rounds. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if let Some(handle) = self.schedule.take() {
            handle.abort();
            tracing::info!("auto-refresh stopped");
        }
        self.state.update(|s| s.auto_refresh = false);
    }

    pub fn is_running(&self) -> bool {
        self.schedule.is_some()
    }

    /// Run a single round on the caller's task, outside the schedule.
    pub async fn refresh_now(&self) -> RoundOutcome {
        run_round(self.backend.as_ref(), &self.state).await
    }

    /// Run a single round on its own task, outside the schedule.
    pub fn spawn_round(&self) -> JoinHandle<RoundOutcome> {
        let backend = Arc::clone(&self.backend);
        let state = self.state.clone();
        tokio::spawn(async move { run_round(backend.as_ref(), &state).await })
    }

    pub fn state(&self) -> &StateHandle {
        &self.state
    }
}

impl<B: Backend> Drop for Poller<B> {
    fn drop(&mut self) {
        if let Some(handle) = self.schedule.take() {
            handle.abort();
        }
    }
}

// ── Round ─────────────────────────────────────────────────────────────────────

/// Marks a round in flight for as long as it lives.
///
/// A round that settles hands the state back through [`InFlight::finish`] and
/// clears the mark in its own update. A round dropped before that (aborted
/// task, timed-out caller) clears it on drop.
struct InFlight<'a> {
    state: &'a StateHandle,
    armed: bool,
}

impl<'a> InFlight<'a> {
    fn begin(state: &'a StateHandle) -> Self {
        state.update(|s| s.round_started());
        Self { state, armed: true }
    }

    fn finish(mut self) -> &'a StateHandle {
        self.armed = false;
        self.state
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed {
            tracing::debug!("poll round dropped before settling");
            self.state.update(|s| s.round_settled());
        }
    }
}

/// Fetch both slices concurrently and apply them under the round policy.
///
/// Cancel-safe: dropping the future mid-fetch leaves the state untouched
/// apart from clearing the round's loading mark.
pub async fn run_round<B: Backend>(backend: &B, state: &StateHandle) -> RoundOutcome {
    let in_flight = InFlight::begin(state);

    let (sessions, credentials) = tokio::join!(backend.list_sessions(), backend.list_credentials());
    let outcome = settle(in_flight.finish(), sessions, credentials);

    match &outcome {
        RoundOutcome::Applied {
            sessions,
            credentials,
        } => tracing::debug!(sessions, credentials, "poll round applied"),
        RoundOutcome::Failed(reason) => tracing::warn!(error = %reason, "poll round failed"),
    }
    outcome
}

/// Fold both fetch results into the state as one atomic update.
fn settle(
    state: &StateHandle,
    sessions: Result<Response<Vec<Session>>>,
    credentials: Result<Response<Vec<Credential>>>,
) -> RoundOutcome {
    state.update(|s| {
        s.round_settled();

        let (sessions, credentials) = match (sessions, credentials) {
            (Ok(sessions), Ok(credentials)) => (sessions, credentials),
            (Err(e), _) | (_, Err(e)) => {
                s.error = Some(FETCH_ERROR_MESSAGE.to_string());
                return RoundOutcome::Failed(e.to_string());
            }
        };

        let sessions_applied = match sessions {
            Response::Ok(list) => {
                let pinned = s.store.replace_sessions(list);
                if pinned > 0 {
                    tracing::debug!(pinned, "kept local terminal status over poll data");
                }
                true
            }
            Response::Rejected(status) => {
                tracing::warn!(status, "sessions fetch rejected; keeping stale sessions");
                false
            }
        };
        let credentials_applied = match credentials {
            Response::Ok(list) => {
                s.store.replace_credentials(list);
                true
            }
            Response::Rejected(status) => {
                tracing::warn!(status, "credentials fetch rejected; keeping stale credentials");
                false
            }
        };

        s.error = None;
        if sessions_applied || credentials_applied {
            s.last_refresh = Some(Utc::now());
        }
        RoundOutcome::Applied {
            sessions: sessions_applied,
            credentials: credentials_applied,
        }
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
