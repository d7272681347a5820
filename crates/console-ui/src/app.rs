//! Main application state and TUI event loop for the proxy console.
//!
//! [`App`] owns the theme, the active tab, the selection, and the last
//! received state snapshot. Key presses are translated into [`Command`]s by
//! [`App::handle_key`]; the event loop executes them against the poller and
//! the action dispatcher.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    text::{Line, Span, Text},
    widgets::Paragraph,
    Frame, Terminal,
};
use tokio::sync::mpsc;

use console_core::formatting::short_id;
use console_core::models::{Credential, Session};
use console_runtime::backend::Backend;
use console_runtime::dispatcher::{ActionDispatcher, TerminateOutcome};
use console_runtime::poller::Poller;
use console_runtime::state::MonitorState;

use crate::components::header::Header;
use crate::credential_view;
use crate::session_view;
use crate::themes::Theme;

const HELP: &str =
    "Tab switch  ↑/↓ select  Enter details  t terminate  e export  a auto-refresh  r refresh  q quit";

// ── Tab / Command / StatusMessage ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Sessions,
    Credentials,
}

impl Tab {
    pub fn toggle(self) -> Self {
        match self {
            Self::Sessions => Self::Credentials,
            Self::Credentials => Self::Sessions,
        }
    }
}

/// Side effect requested by a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    Terminate(String),
    Export,
    ToggleAutoRefresh,
    Refresh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Success,
    Error,
}

/// Outcome of the last operator action, shown in the footer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub level: StatusLevel,
    pub text: String,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Info,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Error,
            text: text.into(),
        }
    }

    /// Footer text for a finished terminate command.
    pub fn for_terminate(session_id: &str, outcome: &TerminateOutcome) -> Self {
        let id = short_id(session_id);
        match outcome {
            TerminateOutcome::Expired => Self::success(format!("Session {id} terminated")),
            TerminateOutcome::Unchanged => {
                Self::info(format!("Session {id}: terminate accepted, nothing to change"))
            }
            TerminateOutcome::Rejected(status) => {
                Self::error(format!("Session {id}: terminate rejected (HTTP {status})"))
            }
            TerminateOutcome::Failed(reason) => {
                Self::error(format!("Session {id}: terminate failed: {reason}"))
            }
        }
    }
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the console TUI.
pub struct App {
    pub theme: Theme,
    /// Backend base URL shown in the header.
    pub api_url: String,
    /// Directory credential exports are written to.
    pub export_dir: PathBuf,
    /// Interval used when auto-refresh is switched back on.
    pub refresh_interval: Duration,
    pub tab: Tab,
    /// Selected row per tab.
    pub selected_session: usize,
    pub selected_credential: usize,
    /// Session shown in the detail popup. Kept as a copy so the popup stays
    /// open when the session drops out of a later poll.
    pub detail: Option<Session>,
    /// Credential shown in the credential popup, kept the same way.
    pub credential_detail: Option<Credential>,
    pub status: Option<StatusMessage>,
    pub should_quit: bool,
    snapshot: MonitorState,
}

impl App {
    pub fn new(
        theme_name: &str,
        api_url: String,
        export_dir: PathBuf,
        refresh_interval: Duration,
    ) -> Self {
        Self {
            theme: Theme::from_name(theme_name),
            api_url,
            export_dir,
            refresh_interval,
            tab: Tab::Sessions,
            selected_session: 0,
            selected_credential: 0,
            detail: None,
            credential_detail: None,
            status: None,
            should_quit: false,
            snapshot: MonitorState::default(),
        }
    }

    pub fn snapshot(&self) -> &MonitorState {
        &self.snapshot
    }

    /// Replace the displayed snapshot, keeping the selection in range and the
    /// detail popup in sync.
    pub fn apply_snapshot(&mut self, snapshot: MonitorState) {
        self.snapshot = snapshot;
        self.selected_session =
            clamp_selection(self.selected_session, self.snapshot.store.sessions().len());
        self.selected_credential = clamp_selection(
            self.selected_credential,
            self.snapshot.store.credentials().len(),
        );
        let fresh = self
            .detail
            .as_ref()
            .and_then(|open| self.snapshot.store.session(&open.id))
            .cloned();
        if fresh.is_some() {
            self.detail = fresh;
        }
        let fresh = self.credential_detail.as_ref().and_then(|open| {
            self.snapshot
                .store
                .credentials()
                .iter()
                .find(|c| c.id == open.id)
                .cloned()
        });
        if fresh.is_some() {
            self.credential_detail = fresh;
        }
    }

    pub fn selected(&self) -> Option<&Session> {
        self.snapshot.store.sessions().get(self.selected_session)
    }

    pub fn current_credential(&self) -> Option<&Credential> {
        self.snapshot.store.credentials().get(self.selected_credential)
    }

    /// Translate a key press into UI state changes and, optionally, a command
    /// for the event loop to execute.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Command> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(Command::Quit);
        }

        if self.detail.is_some() {
            return match key.code {
                KeyCode::Esc | KeyCode::Enter => {
                    self.detail = None;
                    None
                }
                KeyCode::Char('t') => {
                    let session = self.detail.clone()?;
                    self.terminate_command(&session)
                }
                KeyCode::Char('q') | KeyCode::Char('Q') => Some(Command::Quit),
                _ => None,
            };
        }

        if self.credential_detail.is_some() {
            return match key.code {
                KeyCode::Esc | KeyCode::Enter => {
                    self.credential_detail = None;
                    None
                }
                KeyCode::Char('q') | KeyCode::Char('Q') => Some(Command::Quit),
                _ => None,
            };
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => Some(Command::Quit),
            KeyCode::Tab | KeyCode::BackTab => {
                self.tab = self.tab.toggle();
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_selection(-1);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_selection(1);
                None
            }
            KeyCode::Enter => {
                match self.tab {
                    Tab::Sessions => self.detail = self.selected().cloned(),
                    Tab::Credentials => self.credential_detail = self.current_credential().cloned(),
                }
                None
            }
            KeyCode::Char('t') if self.tab == Tab::Sessions => {
                let session = self.selected()?.clone();
                self.terminate_command(&session)
            }
            KeyCode::Char('e') => Some(Command::Export),
            KeyCode::Char('a') => Some(Command::ToggleAutoRefresh),
            KeyCode::Char('r') => Some(Command::Refresh),
            _ => None,
        }
    }

    fn terminate_command(&mut self, session: &Session) -> Option<Command> {
        if session.is_active() {
            self.status = Some(StatusMessage::info(format!(
                "Terminating session {}...",
                short_id(&session.id)
            )));
            Some(Command::Terminate(session.id.clone()))
        } else {
            self.status = Some(StatusMessage::info(format!(
                "Session {} is {}; only active sessions can be terminated",
                short_id(&session.id),
                session.status
            )));
            None
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let (selected, len) = match self.tab {
            Tab::Sessions => (
                &mut self.selected_session,
                self.snapshot.store.sessions().len(),
            ),
            Tab::Credentials => (
                &mut self.selected_credential,
                self.snapshot.store.credentials().len(),
            ),
        };
        if len == 0 {
            *selected = 0;
            return;
        }
        *selected = selected.saturating_add_signed(delta).min(len - 1);
    }

    // ── Event loop ────────────────────────────────────────────────────────────

    /// Run the interactive console until the operator quits.
    ///
    /// Uses `crossterm::event::poll` with a 250 ms timeout so the terminal
    /// loop stays on the current thread while rounds and commands settle on
    /// spawned tasks. State changes arrive through the poller's watch channel.
    pub async fn run<B: Backend>(
        mut self,
        mut poller: Poller<B>,
        dispatcher: ActionDispatcher<B>,
    ) -> io::Result<()> {
        let mut rx = poller.state().subscribe();
        let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel::<(String, TerminateOutcome)>();

        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(250);

        let result = loop {
            if rx.has_changed().unwrap_or(false) {
                let snapshot = rx.borrow_and_update().clone();
                self.apply_snapshot(snapshot);
            }

            while let Ok((session_id, outcome)) = outcome_rx.try_recv() {
                self.status = Some(StatusMessage::for_terminate(&session_id, &outcome));
            }

            if let Err(e) = terminal.draw(|frame| self.render(frame)) {
                break Err(e);
            }

            match event::poll(tick_rate) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => break Err(e),
            }
            let key = match event::read() {
                Ok(Event::Key(key)) => key,
                Ok(_) => continue,
                Err(e) => break Err(e),
            };

            match self.handle_key(key) {
                Some(Command::Quit) => self.should_quit = true,
                Some(Command::Terminate(session_id)) => {
                    let dispatcher = dispatcher.clone();
                    let tx = outcome_tx.clone();
                    tokio::spawn(async move {
                        let outcome = dispatcher.terminate(&session_id).await;
                        let _ = tx.send((session_id, outcome));
                    });
                }
                Some(Command::Export) => {
                    self.status = Some(
                        match dispatcher
                            .export_current()
                            .and_then(|artifact| artifact.write_to(&self.export_dir))
                        {
                            Ok(path) => {
                                tracing::info!(path = %path.display(), "credentials exported");
                                StatusMessage::success(format!("Exported to {}", path.display()))
                            }
                            Err(e) => {
                                tracing::warn!(error = %e, "credential export failed");
                                StatusMessage::error(format!("Export failed: {e}"))
                            }
                        },
                    );
                }
                Some(Command::ToggleAutoRefresh) => {
                    if poller.is_running() {
                        poller.stop();
                        self.status = Some(StatusMessage::info("Auto-refresh paused"));
                    } else {
                        poller.start(self.refresh_interval);
                        self.status = Some(StatusMessage::info("Auto-refresh resumed"));
                    }
                }
                Some(Command::Refresh) => {
                    poller.spawn_round();
                }
                None => {}
            }

            if self.should_quit {
                break Ok(());
            }
        };

        poller.stop();

        // Restore terminal state unconditionally.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    /// Render the current application state into `frame`.
    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let [header_area, tabs_area, body_area, footer_area] = Layout::vertical([
            Constraint::Length(4),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .areas(area);

        let header = Header::from_state(&self.api_url, &self.snapshot, &self.theme);
        frame.render_widget(Paragraph::new(Text::from(header.to_lines())), header_area);
        frame.render_widget(Paragraph::new(self.tabs_line()), tabs_area);

        let store = &self.snapshot.store;
        match self.tab {
            Tab::Sessions if store.sessions().is_empty() => {
                session_view::render_no_sessions(frame, body_area, &self.theme);
            }
            Tab::Sessions => session_view::render_sessions_table(
                frame,
                body_area,
                store.sessions(),
                Some(self.selected_session),
                &Utc::now(),
                &self.theme,
            ),
            Tab::Credentials if store.credentials().is_empty() => {
                credential_view::render_no_credentials(frame, body_area, &self.theme);
            }
            Tab::Credentials => credential_view::render_credentials_table(
                frame,
                body_area,
                store.credentials(),
                Some(self.selected_credential),
                &self.theme,
            ),
        }

        frame.render_widget(Paragraph::new(self.footer_line()), footer_area);

        if let Some(session) = &self.detail {
            let credentials = store.credentials_for(&session.id);
            session_view::render_session_detail(frame, area, session, &credentials, &self.theme);
        }
        if let Some(credential) = &self.credential_detail {
            credential_view::render_credential_detail(frame, area, credential, &self.theme);
        }
    }

    pub fn tabs_line(&self) -> Line<'static> {
        let store = &self.snapshot.store;
        let tab = |label: String, active: bool| {
            let style = if active {
                self.theme.tab_active
            } else {
                self.theme.tab_inactive
            };
            Span::styled(format!(" {label} "), style)
        };
        Line::from(vec![
            tab(
                format!("Active Sessions ({})", store.active_count()),
                self.tab == Tab::Sessions,
            ),
            Span::raw(" "),
            tab(
                format!("Captured Credentials ({})", store.credentials().len()),
                self.tab == Tab::Credentials,
            ),
        ])
    }

    pub fn footer_line(&self) -> Line<'static> {
        match &self.status {
            Some(message) => {
                let style = match message.level {
                    StatusLevel::Info => self.theme.info,
                    StatusLevel::Success => self.theme.success,
                    StatusLevel::Error => self.theme.error,
                };
                Line::from(Span::styled(message.text.clone(), style))
            }
            None => Line::from(Span::styled(HELP, self.theme.dim)),
        }
    }
}

fn clamp_selection(selected: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else {
        selected.min(len - 1)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
