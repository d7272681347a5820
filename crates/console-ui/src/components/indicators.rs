use ratatui::text::{Line, Span};

use console_core::models::SessionStatus;
use console_core::threat::ThreatTier;

use crate::themes::Theme;

// ── ThreatIndicator ──────────────────────────────────────────────────────────

/// Threat level rendered as `NN%`, coloured by tier.
///
/// | Level   | Tier   |
/// |---------|--------|
/// | ≥ 70    | high   |
/// | 40 – 69 | medium |
/// | < 40    | low    |
pub struct ThreatIndicator<'a> {
    pub level: u8,
    pub theme: &'a Theme,
}

impl<'a> ThreatIndicator<'a> {
    pub fn new(level: u8, theme: &'a Theme) -> Self {
        Self { level, theme }
    }

    pub fn tier(&self) -> ThreatTier {
        ThreatTier::classify(self.level)
    }

    pub fn label(&self) -> String {
        format!("{}%", self.level)
    }

    pub fn to_span(&self) -> Span<'a> {
        Span::styled(self.label(), self.theme.threat_style(self.tier()))
    }

    /// Format: `"Threat: 85% (high)"`
    pub fn to_line(&self) -> Line<'a> {
        let style = self.theme.threat_style(self.tier());
        Line::from(vec![
            Span::styled("Threat: ", self.theme.label),
            Span::styled(self.label(), style),
            Span::styled(format!(" ({})", self.tier()), style),
        ])
    }
}

// ── StatusBadge ──────────────────────────────────────────────────────────────

/// Session status rendered as an upper-case badge.
pub struct StatusBadge<'a> {
    pub status: SessionStatus,
    pub theme: &'a Theme,
}

impl<'a> StatusBadge<'a> {
    pub fn new(status: SessionStatus, theme: &'a Theme) -> Self {
        Self { status, theme }
    }

    pub fn to_span(&self) -> Span<'a> {
        Span::styled(
            self.status.as_str().to_uppercase(),
            self.theme.status_style(self.status),
        )
    }
}

// ── LoadingIndicator ─────────────────────────────────────────────────────────

pub struct LoadingIndicator<'a> {
    pub theme: &'a Theme,
}

impl<'a> LoadingIndicator<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self { theme }
    }

    pub fn to_line(&self) -> Line<'a> {
        Line::from(Span::styled("⟳ Loading...", self.theme.info))
    }
}

// ── AutoRefreshIndicator ─────────────────────────────────────────────────────

/// `auto-refresh on` in the success colour, `auto-refresh off` dimmed.
pub struct AutoRefreshIndicator<'a> {
    pub enabled: bool,
    pub theme: &'a Theme,
}

impl<'a> AutoRefreshIndicator<'a> {
    pub fn new(enabled: bool, theme: &'a Theme) -> Self {
        Self { enabled, theme }
    }

    pub fn to_spans(&self) -> Vec<Span<'a>> {
        let (state, style) = if self.enabled {
            ("on", self.theme.success)
        } else {
            ("off", self.theme.dim)
        };
        vec![
            Span::styled("auto-refresh ", self.theme.label),
            Span::styled(state, style),
        ]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    #[test]
    fn test_threat_indicator_label() {
        let theme = Theme::dark();
        assert_eq!(ThreatIndicator::new(0, &theme).label(), "0%");
        assert_eq!(ThreatIndicator::new(85, &theme).label(), "85%");
        assert_eq!(ThreatIndicator::new(100, &theme).label(), "100%");
    }

    #[test]
    fn test_threat_indicator_colour_follows_tier() {
        let theme = Theme::dark();
        assert_eq!(ThreatIndicator::new(39, &theme).to_span().style.fg, Some(Color::Green));
        assert_eq!(ThreatIndicator::new(40, &theme).to_span().style.fg, Some(Color::Yellow));
        assert_eq!(ThreatIndicator::new(69, &theme).to_span().style.fg, Some(Color::Yellow));
        assert_eq!(ThreatIndicator::new(70, &theme).to_span().style.fg, Some(Color::Red));
    }

    #[test]
    fn test_threat_indicator_line_spans() {
        let theme = Theme::dark();
        let line = ThreatIndicator::new(85, &theme).to_line();
        assert_eq!(line.spans.len(), 3);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "Threat: 85% (high)");
    }

    #[test]
    fn test_status_badge_uppercase_and_coloured() {
        let theme = Theme::dark();
        let span = StatusBadge::new(SessionStatus::Active, &theme).to_span();
        assert_eq!(span.content, "ACTIVE");
        assert_eq!(span.style.fg, Some(Color::Green));

        let span = StatusBadge::new(SessionStatus::Expired, &theme).to_span();
        assert_eq!(span.content, "EXPIRED");
        assert_eq!(span.style.fg, Some(Color::DarkGray));
    }

    #[test]
    fn test_loading_indicator_text() {
        let theme = Theme::dark();
        let line = LoadingIndicator::new(&theme).to_line();
        assert_eq!(line.spans.len(), 1);
        assert!(line.spans[0].content.contains("Loading"));
    }

    #[test]
    fn test_auto_refresh_indicator_states() {
        let theme = Theme::dark();
        let on = AutoRefreshIndicator::new(true, &theme).to_spans();
        assert_eq!(on[1].content, "on");
        assert_eq!(on[1].style.fg, Some(Color::Green));

        let off = AutoRefreshIndicator::new(false, &theme).to_spans();
        assert_eq!(off[1].content, "off");
        assert_eq!(off[1].style.fg, Some(Color::DarkGray));
    }
}
