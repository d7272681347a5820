//! Sessions table and the session detail popup.

use chrono::{DateTime, Utc};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use console_core::formatting::{
    format_age, format_count, format_timestamp, short_id, truncate_to_width,
};
use console_core::models::{Credential, Session};

use crate::components::indicators::{StatusBadge, ThreatIndicator};
use crate::themes::Theme;

/// Column headers of the sessions table, in display order.
pub const SESSION_COLUMNS: [&str; 9] = [
    "Session ID",
    "Phishlet",
    "IP Address",
    "Country",
    "Start Time",
    "Last Activity",
    "Requests",
    "Threat",
    "Status",
];

/// Display strings for one row of the sessions table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRowData {
    pub id: String,
    pub phishlet: String,
    pub ip: String,
    pub country: String,
    pub start_time: String,
    pub last_activity: String,
    pub requests: String,
}

impl SessionRowData {
    pub fn from_session(session: &Session, now: &DateTime<Utc>) -> Self {
        Self {
            id: short_id(&session.id),
            phishlet: session.phishlet.clone(),
            ip: session.ip.clone(),
            country: session.country.clone(),
            start_time: format_timestamp(&session.start_time),
            last_activity: format_age(&session.last_activity, now),
            requests: format_count(session.request_count),
        }
    }
}

/// Render the sessions table, highlighting `selected`.
pub fn render_sessions_table(
    frame: &mut Frame,
    area: Rect,
    sessions: &[Session],
    selected: Option<usize>,
    now: &DateTime<Utc>,
    theme: &Theme,
) {
    let header = Row::new(
        SESSION_COLUMNS
            .iter()
            .map(|h| Cell::from(*h).style(theme.table_header)),
    )
    .height(1);

    let rows: Vec<Row> = sessions
        .iter()
        .enumerate()
        .map(|(i, session)| {
            let style = if i % 2 == 0 {
                theme.table_row
            } else {
                theme.table_row_alt
            };
            let data = SessionRowData::from_session(session, now);
            Row::new(vec![
                Cell::from(data.id),
                Cell::from(data.phishlet),
                Cell::from(data.ip),
                Cell::from(data.country),
                Cell::from(data.start_time),
                Cell::from(data.last_activity),
                Cell::from(data.requests),
                Cell::from(ThreatIndicator::new(session.threat_level, theme).to_span()),
                Cell::from(StatusBadge::new(session.status, theme).to_span()),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(12),
        Constraint::Length(14),
        Constraint::Length(16),
        Constraint::Length(8),
        Constraint::Length(20),
        Constraint::Length(14),
        Constraint::Length(9),
        Constraint::Length(7),
        Constraint::Length(10),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(" Sessions "))
        .row_highlight_style(theme.table_selected)
        .style(theme.text);

    let mut state = TableState::default().with_selected(selected);
    frame.render_stateful_widget(table, area, &mut state);
}

/// Placeholder shown when the store holds no sessions.
pub fn render_no_sessions(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No sessions found.", theme.warning)),
        Line::from(""),
        Line::from(Span::styled(
            "Sessions appear here once the proxy reports them.",
            theme.dim,
        )),
    ];
    frame.render_widget(
        Paragraph::new(Text::from(text))
            .block(Block::default().borders(Borders::ALL).title(" Sessions ")),
        area,
    );
}

// ── Detail popup ──────────────────────────────────────────────────────────────

fn field<'a>(label: &'a str, value: String, theme: &Theme) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{label:<16}"), theme.label),
        Span::styled(value, theme.value),
    ])
}

/// Build the body of the detail popup for `session`.
///
/// `credentials` is the session's slice of the credentials list (see
/// `StateStore::credentials_for`), not the copy embedded in the session.
pub fn build_detail_lines<'a>(
    session: &'a Session,
    credentials: &[&Credential],
    theme: &'a Theme,
) -> Vec<Line<'a>> {
    let mut lines = vec![
        Line::from(Span::styled("Basic Information", theme.header)),
        field("Session ID", session.id.clone(), theme),
        field("Phishlet", session.phishlet.clone(), theme),
        field("IP Address", session.ip.clone(), theme),
        field("Country", session.country.clone(), theme),
        field("User Agent", session.user_agent.clone(), theme),
        Line::from(""),
        Line::from(Span::styled("Activity", theme.header)),
        field("Start Time", format_timestamp(&session.start_time), theme),
        field("Last Activity", format_timestamp(&session.last_activity), theme),
        field("Request Count", format_count(session.request_count), theme),
        Line::from(vec![
            Span::styled(format!("{:<16}", "Status"), theme.label),
            StatusBadge::new(session.status, theme).to_span(),
        ]),
        Line::from(vec![
            Span::styled(format!("{:<16}", "Threat Level"), theme.label),
            ThreatIndicator::new(session.threat_level, theme).to_span(),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            format!("Captured Credentials ({})", credentials.len()),
            theme.header,
        )),
    ];

    if credentials.is_empty() {
        lines.push(Line::from(Span::styled(
            "No credentials captured for this session.",
            theme.dim,
        )));
    } else {
        lines.push(Line::from(Span::styled(
            format!("{:<12}{:<28}{}", "Type", "Username", "Captured At"),
            theme.table_header,
        )));
        for cred in credentials {
            lines.push(Line::from(Span::styled(
                format!(
                    "{:<12}{:<28}{}",
                    truncate_to_width(&cred.kind, 11),
                    truncate_to_width(&cred.username, 27),
                    format_timestamp(&cred.captured_at)
                ),
                theme.table_row,
            )));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Esc to close", theme.dim)));
    lines
}

/// A rectangle of `percent_x` × `percent_y` centred in `area`.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let [_, middle, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(area);
    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(middle);
    center
}

/// Draw the detail popup for `session` over whatever is already in `area`.
pub fn render_session_detail(
    frame: &mut Frame,
    area: Rect,
    session: &Session,
    credentials: &[&Credential],
    theme: &Theme,
) {
    let popup = centered_rect(80, 80, area);
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(Text::from(build_detail_lines(session, credentials, theme)))
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" Session Details - {} ", session.id)),
            ),
        popup,
    );
}

// ── Tests ─────────────────────────────────────────────────────────────────────
