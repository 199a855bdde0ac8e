//! Persistence seam consumed by the engine.

use chrono::{NaiveDate, NaiveTime};

use crate::interval::Interval;

/// Ordered interval storage keyed by calendar date.
///
/// The engine only issues intents through this trait and never mutates
/// interval records directly. Mutating operations return the number of
/// affected rows; the engine treats anything other than 1 as a
/// desynchronization between itself and the store.
pub trait EntryStore {
    /// Storage-specific error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Whether an open interval exists for `date`.
    fn has_open_entry(&self, date: NaiveDate) -> Result<bool, Self::Error>;

    /// Appends a new open interval starting at `start`.
    fn append_entry(&mut self, date: NaiveDate, start: NaiveTime) -> Result<usize, Self::Error>;

    /// Closes the open interval for `date` at `stop`.
    fn close_entry(&mut self, date: NaiveDate, stop: NaiveTime) -> Result<usize, Self::Error>;

    /// Clears the stop of the most recent interval for `date`.
    fn reopen_last_entry(&mut self, date: NaiveDate) -> Result<usize, Self::Error>;

    /// Deletes the most recent interval for `date` if it is open.
    fn discard_last_open_entry(&mut self, date: NaiveDate) -> Result<usize, Self::Error>;

    /// All intervals for `date`, ascending by id (insertion order).
    fn list_entries(&self, date: NaiveDate) -> Result<Vec<Interval>, Self::Error>;
}
