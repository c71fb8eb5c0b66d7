//! Event time derivation for schedule rows.

use chrono::{NaiveDateTime, TimeZone, Utc};

/// Fixed pattern used to derive event epochs from a (day, time) pair.
pub const EVENT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Derive a UTC epoch second from a schedule row's day and clock time.
///
/// Returns `fallback` when the pair does not match [`EVENT_TIME_FORMAT`]; a
/// row with a garbled time keeps a usable timestamp instead of aborting the
/// parse.
pub fn event_epoch(day: &str, time: &str, fallback: i64) -> i64 {
    let joined = format!("{} {}", day.trim(), time.trim());
    match NaiveDateTime::parse_from_str(&joined, EVENT_TIME_FORMAT) {
        Ok(naive) => Utc.from_utc_datetime(&naive).timestamp(),
        Err(_) => fallback,
    }
}
