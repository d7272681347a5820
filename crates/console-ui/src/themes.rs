use ratatui::style::{Color, Modifier, Style};

use console_core::models::SessionStatus;
use console_core::threat::ThreatTier;

/// Terminal background type detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackgroundType {
    Dark,
    Light,
}

/// Detect terminal background type from the `COLORFGBG` environment variable.
///
/// The variable has the format `"foreground;background"`. Background values
/// 0–6 are considered dark; 7–15 are considered light. Absent or unparseable
/// values fall back to dark.
pub fn detect_background() -> BackgroundType {
    if let Ok(val) = std::env::var("COLORFGBG") {
        if let Some(bg) = val.split(';').next_back() {
            if let Ok(bg_num) = bg.parse::<u8>() {
                return if bg_num <= 6 {
                    BackgroundType::Dark
                } else {
                    BackgroundType::Light
                };
            }
        }
    }
    BackgroundType::Dark
}

/// All styles used by the console widgets.
#[derive(Debug, Clone)]
pub struct Theme {
    // ── Header ───────────────────────────────────────────────────────────────
    pub header: Style,
    pub separator: Style,

    // ── Text ─────────────────────────────────────────────────────────────────
    pub text: Style,
    pub dim: Style,
    pub label: Style,
    pub value: Style,

    // ── Feedback ─────────────────────────────────────────────────────────────
    pub info: Style,
    pub success: Style,
    pub warning: Style,
    pub error: Style,

    // ── Tabs ─────────────────────────────────────────────────────────────────
    pub tab_active: Style,
    pub tab_inactive: Style,

    // ── Tables ───────────────────────────────────────────────────────────────
    pub table_header: Style,
    pub table_row: Style,
    pub table_row_alt: Style,
    pub table_selected: Style,

    // ── Threat tiers ─────────────────────────────────────────────────────────
    pub threat_low: Style,
    pub threat_medium: Style,
    pub threat_high: Style,

    // ── Session status badges ────────────────────────────────────────────────
    pub status_active: Style,
    pub status_completed: Style,
    pub status_blocked: Style,
    pub status_expired: Style,
}

impl Theme {
    // ── Constructors ─────────────────────────────────────────────────────────

    /// Dark-background terminal theme (default).
    pub fn dark() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            separator: Style::default().fg(Color::DarkGray),

            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            label: Style::default().fg(Color::Gray),
            value: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),

            info: Style::default().fg(Color::Cyan),
            success: Style::default().fg(Color::Green),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),

            tab_active: Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),

            table_header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            table_row: Style::default().fg(Color::White),
            table_row_alt: Style::default().fg(Color::Gray),
            table_selected: Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),

            threat_low: Style::default().fg(Color::Green),
            threat_medium: Style::default().fg(Color::Yellow),
            threat_high: Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),

            status_active: Style::default().fg(Color::Green),
            status_completed: Style::default().fg(Color::Cyan),
            status_blocked: Style::default().fg(Color::Red),
            status_expired: Style::default().fg(Color::DarkGray),
        }
    }

    /// Light-background terminal theme.
    ///
    /// Uses dark colours for text so content stays legible against a
    /// white/light-grey terminal canvas.
    pub fn light() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            separator: Style::default().fg(Color::Gray),

            text: Style::default().fg(Color::Black),
            dim: Style::default().fg(Color::Gray),
            label: Style::default().fg(Color::DarkGray),
            value: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),

            info: Style::default().fg(Color::Blue),
            success: Style::default().fg(Color::Green),
            warning: Style::default().fg(Color::Magenta),
            error: Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),

            tab_active: Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),

            table_header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            table_row: Style::default().fg(Color::Black),
            table_row_alt: Style::default().fg(Color::DarkGray),
            table_selected: Style::default()
                .bg(Color::Gray)
                .add_modifier(Modifier::BOLD),

            threat_low: Style::default().fg(Color::Green),
            threat_medium: Style::default().fg(Color::Magenta),
            threat_high: Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),

            status_active: Style::default().fg(Color::Green),
            status_completed: Style::default().fg(Color::Blue),
            status_blocked: Style::default().fg(Color::Red),
            status_expired: Style::default().fg(Color::Gray),
        }
    }

    /// Basic 8-colour ANSI palette without bold or background fills.
    pub fn classic() -> Self {
        Self {
            header: Style::default().fg(Color::Cyan),
            separator: Style::default().fg(Color::DarkGray),

            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            label: Style::default().fg(Color::Gray),
            value: Style::default().fg(Color::White),

            info: Style::default().fg(Color::Cyan),
            success: Style::default().fg(Color::Green),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),

            tab_active: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::REVERSED),
            tab_inactive: Style::default().fg(Color::White),

            table_header: Style::default().fg(Color::Cyan),
            table_row: Style::default().fg(Color::White),
            table_row_alt: Style::default().fg(Color::Gray),
            table_selected: Style::default().add_modifier(Modifier::REVERSED),

            threat_low: Style::default().fg(Color::Green),
            threat_medium: Style::default().fg(Color::Yellow),
            threat_high: Style::default().fg(Color::Red),

            status_active: Style::default().fg(Color::Green),
            status_completed: Style::default().fg(Color::Cyan),
            status_blocked: Style::default().fg(Color::Red),
            status_expired: Style::default().fg(Color::DarkGray),
        }
    }

    /// Choose a theme automatically based on the detected terminal background.
    pub fn auto_detect() -> Self {
        match detect_background() {
            BackgroundType::Light => Self::light(),
            BackgroundType::Dark => Self::dark(),
        }
    }

    /// Construct a theme by name. Falls back to `auto_detect` for unknown
    /// names.
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            "dark" => Self::dark(),
            "classic" => Self::classic(),
            _ => Self::auto_detect(),
        }
    }

    // ── Style helpers ────────────────────────────────────────────────────────

    pub fn threat_style(&self, tier: ThreatTier) -> Style {
        match tier {
            ThreatTier::Low => self.threat_low,
            ThreatTier::Medium => self.threat_medium,
            ThreatTier::High => self.threat_high,
        }
    }

    pub fn status_style(&self, status: SessionStatus) -> Style {
        match status {
            SessionStatus::Active => self.status_active,
            SessionStatus::Completed => self.status_completed,
            SessionStatus::Blocked => self.status_blocked,
            SessionStatus::Expired => self.status_expired,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
