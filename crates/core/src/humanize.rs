//! Relative ages and durations for display.

use chrono::{DateTime, Utc};

/// Minutes after which ages switch to an absolute short date (about 363 days).
pub const DEFAULT_STALE_AFTER_MINUTES: f64 = 523_440.0;

const SHORT_DATE: &str = "%-d %b";

/// Describes how long before `now` the unix time `epoch_secs` was.
///
/// Timestamps in the future are not special-cased and come out as a negative
/// second count.
pub fn time_ago(epoch_secs: i64, now: DateTime<Utc>, stale_after_minutes: f64) -> String {
    let delta_minutes = (now.timestamp() - epoch_secs) as f64 / 60.0;
    if delta_minutes <= stale_after_minutes {
        return format!("{} ago", distance_of_time(delta_minutes));
    }

    DateTime::from_timestamp(epoch_secs, 0)
        .unwrap_or(DateTime::UNIX_EPOCH)
        .format(SHORT_DATE)
        .to_string()
}

fn distance_of_time(minutes: f64) -> String {
    match minutes {
        m if m < 1.0 => format!("{} secs", (m * 60.0) as i64),
        m if m < 59.0 => format!("{} minutes", m as i64),
        m if m < 90.0 => "about an hour".to_string(),
        m if m < 120.0 => "almost 2 hours".to_string(),
        m if m < 1080.0 => format!("{} hours", (m / 60.0) as i64),
        m if m < 1680.0 => "about a day".to_string(),
        m if m < 2160.0 => "more than a day".to_string(),
        m if m < 2520.0 => "almost 2 days".to_string(),
        m if m < 2880.0 => "about 2 days".to_string(),
        m => format!("{} days", (m / 1440.0) as i64),
    }
}

/// Formats microseconds as milliseconds with three decimals, e.g. `1.250ms`.
pub fn format_duration(us: i64) -> String {
    format!("{:.3}ms", us as f64 / 1000.0)
}
