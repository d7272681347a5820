use chrono::{DateTime, Utc};
use ratatui::text::{Line, Span};

use console_core::formatting::format_timestamp;
use console_runtime::state::MonitorState;

use crate::components::indicators::{AutoRefreshIndicator, LoadingIndicator};
use crate::themes::Theme;

/// Decorative marker placed either side of the application title.
pub const MARKER: &str = "◆";

/// Console header rendering four lines:
///
/// 1. Application title (ALL CAPS) between markers.
/// 2. A 60-column `=` separator.
/// 3. `[ backend url | auto-refresh | last refresh ]`.
/// 4. Round status: loading indicator, error banner, or empty.
pub struct Header<'a> {
    pub api_url: &'a str,
    pub auto_refresh: bool,
    pub loading: bool,
    /// Message of the last failed poll round.
    pub error: Option<&'a str>,
    pub last_refresh: Option<DateTime<Utc>>,
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    /// Build a header from a state snapshot.
    pub fn from_state(api_url: &'a str, state: &'a MonitorState, theme: &'a Theme) -> Self {
        Self {
            api_url,
            auto_refresh: state.auto_refresh,
            loading: state.loading(),
            error: state.error.as_deref(),
            last_refresh: state.last_refresh,
            theme,
        }
    }

    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let last_refresh = self
            .last_refresh
            .as_ref()
            .map(format_timestamp)
            .unwrap_or_else(|| "never".to_string());

        let mut info = vec![
            Span::styled("[ ", self.theme.label),
            Span::styled(self.api_url.to_string(), self.theme.value),
            Span::styled(" | ", self.theme.label),
        ];
        info.extend(AutoRefreshIndicator::new(self.auto_refresh, self.theme).to_spans());
        info.extend([
            Span::styled(" | last refresh ", self.theme.label),
            Span::styled(last_refresh, self.theme.value),
            Span::styled(" ]", self.theme.label),
        ]);

        let status = match (self.error, self.loading) {
            (Some(message), _) => Line::from(vec![
                Span::styled("✖ ", self.theme.error),
                Span::styled(message.to_string(), self.theme.error),
            ]),
            (None, true) => LoadingIndicator::new(self.theme).to_line(),
            (None, false) => Line::from(""),
        };

        vec![
            Line::from(vec![
                Span::styled(MARKER, self.theme.header),
                Span::styled(" PROXY SESSION CONSOLE ", self.theme.header),
                Span::styled(MARKER, self.theme.header),
            ]),
            Line::from(Span::styled("=".repeat(60), self.theme.separator)),
            Line::from(info),
            status,
        ]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn header<'a>(theme: &'a Theme) -> Header<'a> {
        Header {
            api_url: "http://localhost:8080",
            auto_refresh: true,
            loading: false,
            error: None,
            last_refresh: None,
            theme,
        }
    }

    #[test]
    fn test_header_to_lines_count() {
        let theme = Theme::dark();
        assert_eq!(header(&theme).to_lines().len(), 4);
    }

    #[test]
    fn test_header_title_and_separator() {
        let theme = Theme::dark();
        let lines = header(&theme).to_lines();

        assert!(text(&lines[0]).contains("PROXY SESSION CONSOLE"));
        let sep = text(&lines[1]);
        assert_eq!(sep.chars().count(), 60);
        assert!(sep.chars().all(|c| c == '='));
    }

    #[test]
    fn test_header_info_line_shows_url_and_refresh_state() {
        let theme = Theme::dark();
        let lines = header(&theme).to_lines();
        let info = text(&lines[2]);

        assert!(info.contains("http://localhost:8080"), "got: {info}");
        assert!(info.contains("auto-refresh on"), "got: {info}");
        assert!(info.contains("last refresh never"), "got: {info}");
    }

    #[test]
    fn test_header_shows_last_refresh_time() {
        let theme = Theme::dark();
        let mut h = header(&theme);
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        h.last_refresh = Some(ts);
        let info = text(&h.to_lines()[2]);
        assert!(info.contains(&format_timestamp(&ts)), "got: {info}");
    }

    #[test]
    fn test_header_error_takes_precedence_over_loading() {
        let theme = Theme::dark();
        let mut h = header(&theme);
        h.loading = true;
        h.error = Some("Failed to fetch session data");
        let status = text(&h.to_lines()[3]);
        assert!(status.contains("Failed to fetch session data"));
        assert!(!status.contains("Loading"));
    }

    #[test]
    fn test_header_loading_line() {
        let theme = Theme::dark();
        let mut h = header(&theme);
        h.loading = true;
        assert!(text(&h.to_lines()[3]).contains("Loading"));
    }

    #[test]
    fn test_header_idle_status_line_is_empty() {
        let theme = Theme::dark();
        assert!(text(&header(&theme).to_lines()[3]).is_empty());
    }

    #[test]
    fn test_header_from_state() {
        let theme = Theme::dark();
        let mut state = MonitorState::default();
        state.error = Some("boom".to_string());
        let h = Header::from_state("http://backend", &state, &theme);
        assert!(!h.auto_refresh);
        assert!(!h.loading);
        assert_eq!(h.error, Some("boom"));
    }
}
