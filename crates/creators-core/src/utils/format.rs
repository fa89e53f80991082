use chrono::{DateTime, Duration, Utc};

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format an optional string, returning a default if None
pub fn format_optional(value: Option<&str>, default: &str) -> String {
    value.unwrap_or(default).to_string()
}

/// Format a timestamp for listings, e.g. "Jan 01, 2024 00:00 UTC"
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format("%b %d, %Y %H:%M UTC").to_string()
}

/// Human readable remaining time, e.g. "in 2h 5m" or "expired"
pub fn format_until(remaining: Duration) -> String {
    let minutes = remaining.num_minutes();
    if remaining <= Duration::zero() {
        "expired".to_string()
    } else if minutes < 1 {
        "in less than a minute".to_string()
    } else if minutes < 60 {
        format!("in {}m", minutes)
    } else if minutes < 1440 {
        format!("in {}h {}m", minutes / 60, minutes % 60)
    } else {
        format!("in {}d {}h", minutes / 1440, (minutes % 1440) / 60)
    }
}
