//! Wall-clock seam.

use chrono::{NaiveDate, NaiveTime};

/// Source of the current date and time-of-day.
///
/// Implementations report local wall-clock values at seconds precision.
pub trait Clock {
    /// Current calendar date.
    fn today(&self) -> NaiveDate;

    /// Current time-of-day.
    fn now(&self) -> NaiveTime;
}
