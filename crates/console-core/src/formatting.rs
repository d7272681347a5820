use chrono::{DateTime, Local, Utc};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Number of leading characters of an id shown in table columns.
pub const SHORT_ID_LEN: usize = 8;

/// Format a non-negative integer with thousands separators.
///
/// # Examples
///
/// ```
/// use console_core::formatting::format_count;
///
/// assert_eq!(format_count(0), "0");
/// assert_eq!(format_count(1_234), "1,234");
/// assert_eq!(format_count(1_234_567), "1,234,567");
/// ```
pub fn format_count(value: u64) -> String {
    group_thousands(&value.to_string())
}

/// Abbreviate an opaque identifier for table display.
///
/// Ids longer than [`SHORT_ID_LEN`] characters are cut and suffixed with
/// `...`; shorter ids are returned unchanged.
///
/// # Examples
///
/// ```
/// use console_core::formatting::short_id;
///
/// assert_eq!(short_id("3f2a9c1e-77b0-4d6e"), "3f2a9c1e...");
/// assert_eq!(short_id("s1"), "s1");
/// ```
pub fn short_id(id: &str) -> String {
    if id.chars().count() <= SHORT_ID_LEN {
        return id.to_string();
    }
    let head: String = id.chars().take(SHORT_ID_LEN).collect();
    format!("{head}...")
}

/// Replace every character of a secret with `*`, preserving its length.
///
/// ```
/// use console_core::formatting::mask_secret;
///
/// assert_eq!(mask_secret("hunter2"), "*******");
/// assert_eq!(mask_secret(""), "");
/// ```
pub fn mask_secret(secret: &str) -> String {
    "*".repeat(secret.chars().count())
}

/// Render a UTC timestamp in the operator's local timezone.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// Human-readable age of `ts` relative to `now`.
///
/// * `< 60 s` → `"12s ago"`
/// * `< 60 m` → `"5m ago"`
/// * otherwise → `"3h 4m ago"`
///
/// Timestamps in the future (clock skew) are reported as `"just now"`.
pub fn format_age(ts: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
    let secs = (*now - *ts).num_seconds();
    if secs <= 0 {
        return "just now".to_string();
    }
    if secs < 60 {
        return format!("{secs}s ago");
    }
    let mins = secs / 60;
    if mins < 60 {
        return format!("{mins}m ago");
    }
    let hours = mins / 60;
    let rem = mins % 60;
    if rem == 0 {
        format!("{hours}h ago")
    } else {
        format!("{hours}h {rem}m ago")
    }
}

/// Truncate `text` so that it occupies at most `max_width` terminal columns,
/// appending `…` when anything was cut.
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let budget = max_width - 1;
    let mut used = 0;
    let mut out = String::new();
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push('…');
    out
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = chars.len() % 3;
    for (i, &c) in chars.iter().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────
