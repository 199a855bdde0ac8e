//! Work intervals - one row of tracked time.

use chrono::{NaiveDate, NaiveTime};

/// A single tracked work interval.
///
/// Intervals never span midnight: `date` is the day `start` falls on, and
/// `stop` (when present) is a time-of-day on the same date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    /// Store-assigned identifier, monotonically increasing per insertion.
    pub id: i64,

    /// Calendar date the interval belongs to.
    pub date: NaiveDate,

    /// Time-of-day the interval began (seconds precision).
    pub start: NaiveTime,

    /// Time-of-day the interval ended; `None` while the interval is open.
    pub stop: Option<NaiveTime>,
}

impl Interval {
    /// Whether the interval is still open.
    ///
    /// Per date, at most one interval is open and it is always the last one.
    pub const fn is_open(&self) -> bool {
        self.stop.is_none()
    }
}
