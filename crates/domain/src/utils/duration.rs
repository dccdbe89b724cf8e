//! Human-readable duration formatting

use chrono::{DateTime, Utc};

use crate::constants::EMPTY_PLACEHOLDER;

/// Compact badge: `Ns`, `Nm`, `Nh` or `Nd` (floored, negatives as `0s`).
pub fn format_badge(seconds: i64) -> String {
    let seconds = seconds.max(0);
    if seconds < 60 {
        return format!("{seconds}s");
    }
    let minutes = seconds / 60;
    if minutes < 60 {
        return format!("{minutes}m");
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours}h");
    }
    format!("{}d", hours / 24)
}

/// Long label such as `2 kun 3 soat 15 min`.
///
/// Days and hours are omitted when zero; minutes are always present. Returns
/// `-` when there is no start.
pub fn format_long_duration(start: Option<DateTime<Utc>>, end: DateTime<Utc>) -> String {
    let Some(start) = start else {
        return EMPTY_PLACEHOLDER.to_string();
    };
    let total = (end - start).num_seconds().max(0);
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;

    let mut parts = Vec::with_capacity(3);
    if days > 0 {
        parts.push(format!("{days} kun"));
    }
    if hours > 0 {
        parts.push(format!("{hours} soat"));
    }
    parts.push(format!("{minutes} min"));
    parts.join(" ")
}

/// Seconds to hours rounded to two decimals.
pub fn round_hours(seconds: i64) -> f64 {
    (seconds as f64 / 3600.0 * 100.0).round() / 100.0
}
