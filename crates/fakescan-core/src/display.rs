//! Formatting helpers for presenting account fields.

use chrono::{DateTime, NaiveDateTime};

const DISPLAY_DATE_FORMAT: &str = "%b %d, %Y";

/// Formats a provider `created_at` value as `Mon DD, YYYY`.
///
/// Empty, `N/A` and `unknown` values render as `N/A`. Values that do not parse
/// as a provider timestamp are returned unchanged.
#[must_use]
pub fn format_created_at(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "N/A" || trimmed == crate::CREATED_AT_UNKNOWN {
        return "N/A".to_string();
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return dt.format(DISPLAY_DATE_FORMAT).to_string();
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.fZ", "%Y-%m-%dT%H:%M:%SZ"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return dt.format(DISPLAY_DATE_FORMAT).to_string();
        }
    }

    raw.to_string()
}

/// Formats a count with thousands separators, e.g. `1234567` → `1,234,567`.
#[must_use]
pub fn format_count(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
