//! Time-of-day arithmetic and duration rendering.
//!
//! All arithmetic is on plain times within a single day; there is no
//! modulo-24h wraparound. A subtraction that would go negative (clock skew,
//! or a stop recorded before a start) is surfaced as [`NegativeDuration`]
//! instead of being clamped.

use chrono::NaiveTime;
use thiserror::Error;

/// A later time turned out to precede an earlier one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("negative duration: {later} is earlier than {earlier}")]
pub struct NegativeDuration {
    pub earlier: NaiveTime,
    pub later: NaiveTime,
}

/// Whole seconds from `earlier` to `later`.
pub fn seconds_between(earlier: NaiveTime, later: NaiveTime) -> Result<i64, NegativeDuration> {
    let secs = (later - earlier).num_seconds();
    if secs < 0 {
        return Err(NegativeDuration { earlier, later });
    }
    Ok(secs)
}

/// Whole minutes from `earlier` to `later`, truncated.
pub fn minutes_between(earlier: NaiveTime, later: NaiveTime) -> Result<i64, NegativeDuration> {
    Ok(seconds_between(earlier, later)? / 60)
}

/// Renders a duration as `1h 1m 1s`, omitting zero units.
///
/// A zero duration renders as `0s`, never as an empty string.
pub fn format_duration(total_seconds: i64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{hours}h "));
    }
    if minutes > 0 {
        out.push_str(&format!("{minutes}m "));
    }
    if seconds > 0 || out.is_empty() {
        out.push_str(&format!("{seconds}s"));
    }
    out.trim_end().to_string()
}

/// Renders an elapsed duration for a live status line.
///
/// Unlike [`format_duration`], seconds are always shown, and minutes are
/// shown whenever hours are, so a running clock reads `45m 0s` rather than
/// collapsing to `45m`.
pub fn format_elapsed(total_seconds: i64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{hours}h "));
    }
    if minutes > 0 || hours > 0 {
        out.push_str(&format!("{minutes}m "));
    }
    out.push_str(&format!("{seconds}s"));
    out
}
