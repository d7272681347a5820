//! Operator commands: terminate a session, export captured credentials.
//!
//! `terminate` is fire-and-forget: the caller gets a [`TerminateOutcome`] for
//! display, but a failed command only leaves the state untouched and logs a
//! warning. Exports are pure transformations of a credential snapshot.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use console_core::error::{ConsoleError, Result};
use console_core::models::Credential;

use crate::backend::{Backend, Response};
use crate::state::StateHandle;

// ── TerminateOutcome ──────────────────────────────────────────────────────────

/// Result of a terminate command, for diagnostics only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminateOutcome {
    /// Backend accepted; the session is now expired locally.
    Expired,
    /// Backend accepted, but the session was unknown or already terminal.
    Unchanged,
    /// Backend answered with a non-success status.
    Rejected(u16),
    /// The request never completed.
    Failed(String),
}

// ── ExportArtifact ────────────────────────────────────────────────────────────

/// A named, ready-to-save export document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    /// `credentials-YYYY-MM-DD.json`
    pub file_name: String,
    /// Pretty-printed UTF-8 JSON array of credentials.
    pub contents: String,
}

impl ExportArtifact {
    /// Write the document into `dir`, creating the directory if needed.
    /// An existing file with the same name is overwritten.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir).map_err(|source| ConsoleError::FileWrite {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, self.contents.as_bytes()).map_err(|source| {
            ConsoleError::FileWrite {
                path: path.clone(),
                source,
            }
        })?;
        Ok(path)
    }
}

/// Serialize `credentials` in order, secrets included, into an artifact named
/// after today's UTC date.
pub fn export_credentials(credentials: &[Credential]) -> Result<ExportArtifact> {
    export_credentials_on(credentials, Utc::now().date_naive())
}

/// [`export_credentials`] with an explicit date for the artifact name.
pub fn export_credentials_on(credentials: &[Credential], date: NaiveDate) -> Result<ExportArtifact> {
    let contents = serde_json::to_string_pretty(credentials)
        .map_err(|e| ConsoleError::Serialization(e.to_string()))?;
    Ok(ExportArtifact {
        file_name: format!("credentials-{}.json", date.format("%Y-%m-%d")),
        contents,
    })
}

/// Re-import a document produced by [`export_credentials`].
pub fn parse_export(contents: &str) -> Result<Vec<Credential>> {
    Ok(serde_json::from_str(contents)?)
}

// ── ActionDispatcher ──────────────────────────────────────────────────────────

/// Issues state-changing commands and applies their local effect.
pub struct ActionDispatcher<B: Backend> {
    backend: Arc<B>,
    state: StateHandle,
}

impl<B: Backend> Clone for ActionDispatcher<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            state: self.state.clone(),
        }
    }
}

impl<B: Backend> ActionDispatcher<B> {
    pub fn new(backend: Arc<B>, state: StateHandle) -> Self {
        Self { backend, state }
    }

    /// Ask the backend to terminate `session_id`; on success mark it expired
    /// locally without waiting for the next poll.
    ///
    /// The command is sent at most once, whatever the local status.
    pub async fn terminate(&self, session_id: &str) -> TerminateOutcome {
        match self.backend.terminate_session(session_id).await {
            Ok(Response::Ok(())) => {
                let changed = self.state.update(|s| s.store.mark_expired(session_id));
                if changed {
                    tracing::info!(session_id, "session terminated");
                    TerminateOutcome::Expired
                } else {
                    tracing::debug!(session_id, "terminate accepted; no local transition");
                    TerminateOutcome::Unchanged
                }
            }
            Ok(Response::Rejected(status)) => {
                tracing::warn!(session_id, status, "terminate rejected by backend");
                TerminateOutcome::Rejected(status)
            }
            Err(e) => {
                tracing::warn!(session_id, error = %e, "terminate request failed");
                TerminateOutcome::Failed(e.to_string())
            }
        }
    }

    /// Export the credentials currently held in the shared state.
    pub fn export_current(&self) -> Result<ExportArtifact> {
        let snapshot = self.state.snapshot();
        export_credentials(snapshot.store.credentials())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
