//! System wall clock.

use chrono::{Local, NaiveDate, NaiveTime, Timelike};

use tk_core::Clock;

/// Local wall clock at seconds precision.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn now(&self) -> NaiveTime {
        let now = Local::now().time();
        // Stored times carry whole seconds only.
        now.with_nanosecond(0).unwrap_or(now)
    }
}
