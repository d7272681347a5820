//! Captured credentials table and the credential detail popup.
//!
//! Passwords never reach the screen: they are masked to `*` of the same
//! length. The table summarises additional data by key count; the popup
//! shows it in full as pretty-printed JSON.

use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use console_core::formatting::{format_timestamp, mask_secret, short_id};
use console_core::models::{AdditionalData, Credential};

use crate::session_view::centered_rect;
use crate::themes::Theme;

/// Column headers of the credentials table, in display order.
pub const CREDENTIAL_COLUMNS: [&str; 6] = [
    "Session ID",
    "Type",
    "Username",
    "Password",
    "Captured At",
    "Additional Data",
];

/// Display strings for one row of the credentials table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRowData {
    pub session_id: String,
    pub kind: String,
    pub username: String,
    pub password: String,
    pub captured_at: String,
    pub additional: String,
}

impl CredentialRowData {
    pub fn from_credential(credential: &Credential) -> Self {
        Self {
            session_id: short_id(&credential.session_id),
            kind: credential.kind.clone(),
            username: credential.username.clone(),
            password: mask_secret(&credential.password),
            captured_at: format_timestamp(&credential.captured_at),
            additional: summarize_additional(&credential.additional_data),
        }
    }
}

/// `None` for an empty map, otherwise the number of keys.
pub fn summarize_additional(data: &AdditionalData) -> String {
    match data.len() {
        0 => "None".to_string(),
        1 => "1 key".to_string(),
        n => format!("{n} keys"),
    }
}

pub fn render_credentials_table(
    frame: &mut Frame,
    area: Rect,
    credentials: &[Credential],
    selected: Option<usize>,
    theme: &Theme,
) {
    let header = Row::new(
        CREDENTIAL_COLUMNS
            .iter()
            .map(|h| Cell::from(*h).style(theme.table_header)),
    )
    .height(1);

    let rows: Vec<Row> = credentials
        .iter()
        .enumerate()
        .map(|(i, credential)| {
            let style = if i % 2 == 0 {
                theme.table_row
            } else {
                theme.table_row_alt
            };
            let data = CredentialRowData::from_credential(credential);
            let additional_style = if credential.additional_data.is_empty() {
                theme.dim
            } else {
                theme.info
            };
            Row::new(vec![
                Cell::from(data.session_id),
                Cell::from(data.kind),
                Cell::from(data.username),
                Cell::from(data.password),
                Cell::from(data.captured_at),
                Cell::from(data.additional).style(additional_style),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(12),
        Constraint::Length(10),
        Constraint::Length(28),
        Constraint::Length(16),
        Constraint::Length(20),
        Constraint::Length(16),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Captured Credentials "),
        )
        .row_highlight_style(theme.table_selected)
        .style(theme.text);

    let mut state = TableState::default().with_selected(selected);
    frame.render_stateful_widget(table, area, &mut state);
}

/// Placeholder shown when nothing has been captured yet.
pub fn render_no_credentials(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No credentials captured yet.", theme.warning)),
    ];
    frame.render_widget(
        Paragraph::new(Text::from(text)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Captured Credentials "),
        ),
        area,
    );
}

fn field<'a>(label: &'a str, value: String, theme: &Theme) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{label:<16}"), theme.label),
        Span::styled(value, theme.value),
    ])
}

/// `additionalData` as indented JSON, keys in map order.
pub fn pretty_additional(data: &AdditionalData) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|e| format!("<unprintable: {e}>"))
}

/// Build the body of the detail popup for `credential`.
pub fn build_credential_detail_lines<'a>(
    credential: &'a Credential,
    theme: &'a Theme,
) -> Vec<Line<'a>> {
    let mut lines = vec![
        Line::from(Span::styled("Credential", theme.header)),
        field("Credential ID", credential.id.clone(), theme),
        field("Session ID", credential.session_id.clone(), theme),
        field("Type", credential.kind.clone(), theme),
        field("Username", credential.username.clone(), theme),
        field("Password", mask_secret(&credential.password), theme),
        field("Captured At", format_timestamp(&credential.captured_at), theme),
        Line::from(""),
        Line::from(Span::styled(
            format!(
                "Additional Data ({})",
                summarize_additional(&credential.additional_data)
            ),
            theme.header,
        )),
    ];

    if credential.additional_data.is_empty() {
        lines.push(Line::from(Span::styled(
            "No additional data captured.",
            theme.dim,
        )));
    } else {
        lines.extend(
            pretty_additional(&credential.additional_data)
                .lines()
                .map(|l| Line::from(Span::styled(l.to_string(), theme.value))),
        );
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Esc to close", theme.dim)));
    lines
}

/// Draw the detail popup for `credential` over whatever is already in `area`.
pub fn render_credential_detail(
    frame: &mut Frame,
    area: Rect,
    credential: &Credential,
    theme: &Theme,
) {
    let popup = centered_rect(80, 80, area);
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(Text::from(build_credential_detail_lines(credential, theme)))
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" Credential Details - {} ", credential.id)),
            ),
        popup,
    );
}

// ── Tests ─────────────────────────────────────────────────────────────────────
