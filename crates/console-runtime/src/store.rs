//! In-memory view of the backend's sessions and credentials.
//!
//! [`StateStore`] is a plain value: every mutation is a complete, synchronous
//! operation. Sharing happens one level up in [`crate::state::StateHandle`],
//! which serializes writers and hands readers immutable snapshots.

use std::collections::HashMap;

use console_core::models::{Credential, Session, SessionStatus};

/// Current mirror of the backend state.
#[derive(Debug, Clone, Default)]
pub struct StateStore {
    /// Sessions in server order.
    sessions: Vec<Session>,
    /// id → position in `sessions`.
    index: HashMap<String, usize>,
    /// Credentials in server order.
    credentials: Vec<Credential>,
    /// Every id this process has seen in a terminal status, with that status.
    ///
    /// Outlives the session's presence in `sessions` so a stale poll that
    /// re-lists a terminated session cannot bring it back to life.
    terminal: HashMap<String, SessionStatus>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Writes ────────────────────────────────────────────────────────────

    /// Overwrite the session mapping with `sessions`.
    ///
    /// Records are replaced wholesale, never merged field by field. The one
    /// exception is status: an id already known to be terminal keeps its
    /// terminal status whatever the incoming record says. Duplicate ids in
    /// one payload collapse onto the first position, last record wins.
    ///
    /// Returns the number of incoming records whose status was pinned.
    pub fn replace_sessions(&mut self, sessions: Vec<Session>) -> usize {
        let mut pinned = 0;
        let mut ordered: Vec<Session> = Vec::with_capacity(sessions.len());
        let mut index: HashMap<String, usize> = HashMap::with_capacity(sessions.len());

        for mut session in sessions {
            if let Some(&held) = self.terminal.get(&session.id) {
                if session.status != held {
                    tracing::debug!(
                        session_id = %session.id,
                        incoming = %session.status,
                        kept = %held,
                        "ignoring status change for terminal session"
                    );
                    session.status = held;
                    pinned += 1;
                }
            } else if session.status.is_terminal() {
                self.terminal.insert(session.id.clone(), session.status);
            }

            match index.get(&session.id) {
                Some(&pos) => ordered[pos] = session,
                None => {
                    index.insert(session.id.clone(), ordered.len());
                    ordered.push(session);
                }
            }
        }

        self.sessions = ordered;
        self.index = index;
        pinned
    }

    /// Overwrite the credential sequence, preserving server order.
    pub fn replace_credentials(&mut self, credentials: Vec<Credential>) {
        self.credentials = credentials;
    }

    /// Transition `session_id` from active to expired.
    ///
    /// No-op when the id is unknown or the session is already terminal.
    /// Returns `true` when the status actually changed.
    pub fn mark_expired(&mut self, session_id: &str) -> bool {
        let Some(&pos) = self.index.get(session_id) else {
            return false;
        };
        let session = &mut self.sessions[pos];
        if session.status != SessionStatus::Active {
            return false;
        }
        session.status = SessionStatus::Expired;
        self.terminal
            .insert(session_id.to_string(), SessionStatus::Expired);
        true
    }

    // ── Reads ─────────────────────────────────────────────────────────────

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn session(&self, session_id: &str) -> Option<&Session> {
        self.index.get(session_id).map(|&pos| &self.sessions[pos])
    }

    pub fn credentials(&self) -> &[Credential] {
        &self.credentials
    }

    /// Credentials whose owner is `session_id`, in server order.
    pub fn credentials_for(&self, session_id: &str) -> Vec<&Credential> {
        self.credentials
            .iter()
            .filter(|c| c.session_id == session_id)
            .collect()
    }

    pub fn active_count(&self) -> usize {
        self.sessions.iter().filter(|s| s.is_active()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty() && self.credentials.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use console_core::models::AdditionalData;

    // ── helpers ───────────────────────────────────────────────────────────

    pub(crate) fn session(id: &str, status: SessionStatus, threat: u8) -> Session {
        let t = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        Session {
            id: id.to_string(),
            phishlet: "o365".to_string(),
            ip: "198.51.100.20".to_string(),
            user_agent: "Mozilla/5.0".to_string(),
            country: "NL".to_string(),
            start_time: t,
            last_activity: t,
            status,
            request_count: 12,
            threat_level: threat,
            credentials: vec![],
        }
    }

    pub(crate) fn credential(id: &str, session_id: &str) -> Credential {
        Credential {
            id: id.to_string(),
            session_id: session_id.to_string(),
            kind: "password".to_string(),
            username: format!("user-{id}"),
            password: format!("secret-{id}"),
            captured_at: Utc.with_ymd_and_hms(2024, 5, 1, 10, 1, 0).unwrap(),
            additional_data: AdditionalData::new(),
        }
    }

    // ── replace_sessions ──────────────────────────────────────────────────

    #[test]
    fn test_new_store_is_empty() {
        let store = StateStore::new();
        assert!(store.is_empty());
        assert_eq!(store.active_count(), 0);
    }

    #[test]
    fn test_replace_sessions_overwrites_everything() {
        let mut store = StateStore::new();
        store.replace_sessions(vec![
            session("s1", SessionStatus::Active, 10),
            session("s2", SessionStatus::Active, 20),
        ]);
        store.replace_sessions(vec![session("s3", SessionStatus::Active, 30)]);

        assert_eq!(store.sessions().len(), 1);
        assert!(store.session("s1").is_none());
        assert_eq!(store.session("s3").unwrap().threat_level, 30);
    }

    #[test]
    fn test_replace_sessions_keeps_server_order() {
        let mut store = StateStore::new();
        store.replace_sessions(vec![
            session("zz", SessionStatus::Active, 1),
            session("aa", SessionStatus::Active, 2),
            session("mm", SessionStatus::Active, 3),
        ]);
        let ids: Vec<&str> = store.sessions().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["zz", "aa", "mm"]);
    }

    #[test]
    fn test_replace_sessions_duplicate_ids_last_wins() {
        let mut store = StateStore::new();
        store.replace_sessions(vec![
            session("s1", SessionStatus::Active, 10),
            session("s2", SessionStatus::Active, 20),
            session("s1", SessionStatus::Active, 99),
        ]);
        assert_eq!(store.sessions().len(), 2);
        assert_eq!(store.sessions()[0].id, "s1");
        assert_eq!(store.session("s1").unwrap().threat_level, 99);
    }

    #[test]
    fn test_replace_sessions_replaces_non_status_fields() {
        let mut store = StateStore::new();
        store.replace_sessions(vec![session("s1", SessionStatus::Active, 10)]);

        let mut updated = session("s1", SessionStatus::Active, 55);
        updated.request_count = 40;
        store.replace_sessions(vec![updated]);

        let s = store.session("s1").unwrap();
        assert_eq!(s.request_count, 40);
        assert_eq!(s.threat_level, 55);
    }

    // ── terminal precedence ───────────────────────────────────────────────

    #[test]
    fn test_poll_cannot_resurrect_locally_expired_session() {
        let mut store = StateStore::new();
        store.replace_sessions(vec![session("s1", SessionStatus::Active, 10)]);
        assert!(store.mark_expired("s1"));

        let pinned = store.replace_sessions(vec![session("s1", SessionStatus::Active, 10)]);
        assert_eq!(pinned, 1);
        assert_eq!(store.session("s1").unwrap().status, SessionStatus::Expired);
    }

    #[test]
    fn test_server_terminal_status_is_sticky() {
        let mut store = StateStore::new();
        store.replace_sessions(vec![session("s1", SessionStatus::Blocked, 90)]);
        store.replace_sessions(vec![session("s1", SessionStatus::Active, 90)]);
        assert_eq!(store.session("s1").unwrap().status, SessionStatus::Blocked);

        // A different terminal value does not overwrite the first one either.
        store.replace_sessions(vec![session("s1", SessionStatus::Completed, 90)]);
        assert_eq!(store.session("s1").unwrap().status, SessionStatus::Blocked);
    }

    #[test]
    fn test_terminal_guard_survives_absence() {
        let mut store = StateStore::new();
        store.replace_sessions(vec![session("s1", SessionStatus::Active, 10)]);
        store.mark_expired("s1");

        // Session vanishes from one poll and reappears as active in a stale one.
        store.replace_sessions(vec![]);
        assert!(store.session("s1").is_none());
        store.replace_sessions(vec![session("s1", SessionStatus::Active, 10)]);
        assert_eq!(store.session("s1").unwrap().status, SessionStatus::Expired);
    }

    #[test]
    fn test_active_to_server_terminal_is_accepted() {
        let mut store = StateStore::new();
        store.replace_sessions(vec![session("s1", SessionStatus::Active, 10)]);
        let pinned = store.replace_sessions(vec![session("s1", SessionStatus::Completed, 10)]);
        assert_eq!(pinned, 0);
        assert_eq!(store.session("s1").unwrap().status, SessionStatus::Completed);
    }

    // ── mark_expired ──────────────────────────────────────────────────────

    #[test]
    fn test_mark_expired_only_touches_target() {
        let mut store = StateStore::new();
        store.replace_sessions(vec![
            session("s1", SessionStatus::Active, 10),
            session("s2", SessionStatus::Active, 20),
        ]);
        let before = store.session("s2").cloned().unwrap();

        assert!(store.mark_expired("s1"));
        assert_eq!(store.session("s1").unwrap().status, SessionStatus::Expired);
        assert_eq!(store.session("s2").unwrap(), &before);
        assert_eq!(store.active_count(), 1);
    }

    #[test]
    fn test_mark_expired_noop_for_terminal_statuses() {
        for status in [
            SessionStatus::Completed,
            SessionStatus::Blocked,
            SessionStatus::Expired,
        ] {
            let mut store = StateStore::new();
            store.replace_sessions(vec![session("s1", status, 10)]);
            assert!(!store.mark_expired("s1"));
            assert_eq!(store.session("s1").unwrap().status, status);
        }
    }

    #[test]
    fn test_mark_expired_unknown_id_is_noop() {
        let mut store = StateStore::new();
        store.replace_sessions(vec![session("s1", SessionStatus::Active, 10)]);
        assert!(!store.mark_expired("nope"));
        assert_eq!(store.active_count(), 1);
    }

    // ── credentials ───────────────────────────────────────────────────────

    #[test]
    fn test_replace_credentials_preserves_order() {
        let mut store = StateStore::new();
        store.replace_credentials(vec![
            credential("c3", "s1"),
            credential("c1", "s2"),
            credential("c2", "s1"),
        ]);
        let ids: Vec<&str> = store.credentials().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c3", "c1", "c2"]);

        store.replace_credentials(vec![]);
        assert!(store.credentials().is_empty());
    }

    #[test]
    fn test_credentials_for_session() {
        let mut store = StateStore::new();
        store.replace_credentials(vec![
            credential("c1", "s1"),
            credential("c2", "s2"),
            credential("c3", "s1"),
        ]);
        let ids: Vec<&str> = store
            .credentials_for("s1")
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(ids, vec!["c1", "c3"]);
        assert!(store.credentials_for("s9").is_empty());
    }
}
