use chrono::{Local, Utc};

const MINUTES_PER_DAY: i64 = 24 * 60;

pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Today's date in the local timezone, `YYYY-MM-DD`.
pub fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Parse an `HH:MM` clock time into minutes since midnight.
/// Lenient on shape: anything that is not two numeric fields is `None`.
pub fn parse_clock(value: &str) -> Option<i64> {
    let (hours, minutes) = value.split_once(':')?;
    let hours: i64 = hours.trim().parse().ok()?;
    let minutes: i64 = minutes.trim().parse().ok()?;
    if hours < 0 || minutes < 0 {
        return None;
    }
    Some(hours * 60 + minutes)
}

/// Minutes elapsed from `start` to `end`, wrapping across midnight.
/// An end before the start is read as overnight; equal times are zero.
pub fn clock_span_minutes(start: &str, end: &str) -> Option<i64> {
    let start = parse_clock(start)?;
    let end = parse_clock(end)?;
    Some((end - start).rem_euclid(MINUTES_PER_DAY))
}
