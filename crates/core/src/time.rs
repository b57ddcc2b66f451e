use std::time::Duration;

use chrono::DateTime;

use crate::error::{Result, TraceWebError};

const MICROS_PER_SEC: i64 = 1_000_000;

/// RFC 822 layout used for absolute span start times.
const RFC822: &str = "%d %b %y %H:%M %Z";

pub fn micros_to_secs(us: i64) -> i64 {
    us.div_euclid(MICROS_PER_SEC)
}

/// Formats a microsecond timestamp as RFC 822, truncated to whole seconds.
pub fn format_timestamp(us: i64) -> String {
    let secs = micros_to_secs(us);
    DateTime::from_timestamp(secs, 0)
        .unwrap_or(DateTime::UNIX_EPOCH)
        .format(RFC822)
        .to_string()
}

pub fn parse_duration_str(input: &str) -> Result<Duration> {
    humantime::parse_duration(input)
        .map_err(|e| TraceWebError::Parse(format!("invalid duration {input}: {e}")))
}
