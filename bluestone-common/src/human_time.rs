//! Human-readable duration formatting
//!
//! Track lengths shown to listeners use clock-style formatting:
//! `M:SS` below one hour, `H:MM:SS` below one day, `Dd-H:MM:SS` beyond.

const SECONDS_PER_HOUR: u64 = 3600;
const SECONDS_PER_DAY: u64 = 86400;

/// Format a duration given in whole seconds.
///
/// # Examples
///
/// ```
/// use bluestone_common::human_time::format_duration;
///
/// assert_eq!(format_duration(0), "0:00");
/// assert_eq!(format_duration(45), "0:45");
/// assert_eq!(format_duration(330), "5:30");
/// assert_eq!(format_duration(3661), "1:01:01");
/// assert_eq!(format_duration(90061), "1d-1:01:01");
/// ```
pub fn format_duration(seconds: u64) -> String {
    let days = seconds / SECONDS_PER_DAY;
    let hours = (seconds % SECONDS_PER_DAY) / SECONDS_PER_HOUR;
    let mins = (seconds % SECONDS_PER_HOUR) / 60;
    let secs = seconds % 60;

    if days > 0 {
        format!("{}d-{}:{:02}:{:02}", days, hours, mins, secs)
    } else if hours > 0 {
        format!("{}:{:02}:{:02}", hours, mins, secs)
    } else {
        format!("{}:{:02}", mins, secs)
    }
}

/// Format a duration given in milliseconds (truncated to whole seconds).
///
/// Streams of unknown length are reported by engines as `u64::MAX`; those
/// render as `LIVE`.
pub fn format_duration_ms(duration_ms: u64) -> String {
    if duration_ms == u64::MAX {
        return "LIVE".to_string();
    }
    format_duration(duration_ms / 1000)
}
