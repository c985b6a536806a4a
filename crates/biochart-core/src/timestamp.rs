//! Recording start time handling and elapsed-time helpers

use chrono::{Local, NaiveDateTime};

/// Layout of the combined `DD.MM.YY HH.MM.SS` start date/time header fields
pub const START_TIME_FORMAT: &str = "%d.%m.%y %H.%M.%S";

/// Parse the container's start date and start time fields.
///
/// Two-digit years 00-68 map to 20xx and 69-99 to 19xx.
pub fn parse_start_time(date: &str, time: &str) -> Option<NaiveDateTime> {
    let combined = format!("{} {}", date.trim(), time.trim());
    NaiveDateTime::parse_from_str(&combined, START_TIME_FORMAT).ok()
}

/// Parse the start fields, substituting the current local time when they are unreadable
pub fn parse_start_time_or_now(date: &str, time: &str) -> NaiveDateTime {
    parse_start_time(date, time).unwrap_or_else(|| {
        tracing::warn!(date, time, "unreadable recording start time, using current time");
        Local::now().naive_local()
    })
}

/// Render a start time back into the two 8-byte header fields
pub fn format_start_time(start: &NaiveDateTime) -> (String, String) {
    (
        start.format("%d.%m.%y").to_string(),
        start.format("%H.%M.%S").to_string(),
    )
}

/// Format elapsed seconds as `HH:MM:SS.mmm`
pub fn format_elapsed(seconds: f64) -> String {
    let whole = seconds.max(0.0).trunc() as u64;
    let millis = ((seconds.max(0.0) - whole as f64) * 1000.0) as u64;

    format!(
        "{:02}:{:02}:{:02}.{:03}",
        whole / 3600,
        (whole % 3600) / 60,
        whole % 60,
        millis
    )
}

/// Restrict a value to `[min, max]`
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Map a value linearly from one range onto another.
///
/// A degenerate source range maps everything to `to_min`.
pub fn linear_map(value: f64, from_min: f64, from_max: f64, to_min: f64, to_max: f64) -> f64 {
    if from_max == from_min {
        return to_min;
    }
    let ratio = (value - from_min) / (from_max - from_min);
    to_min + ratio * (to_max - to_min)
}
