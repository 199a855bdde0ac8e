//! Interval state machine.
//!
//! All four transitions a tick can take - start, stop, resume, discard -
//! live here, gated on the same last-entry lookup, so the decision logic
//! stays auditable in one place. The engine issues intents through
//! [`EntryStore`] and never touches interval rows itself.

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

use crate::duration::{NegativeDuration, seconds_between};
use crate::report::{self, DayStatus, WorkBreakSummary};
use crate::store::EntryStore;

/// Engine tunables.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Shortest interval worth keeping. A tick that would close an interval
    /// shorter than this discards it instead.
    /// Default: 60.
    pub min_interval_secs: i64,

    /// Longest gap worth auto-merging. A tick that starts within this many
    /// seconds of the last stop reopens that interval instead of appending.
    /// Default: 60.
    pub short_break_secs: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_interval_secs: 60,
            short_break_secs: 60,
        }
    }
}

/// What a tick did, with everything rendering needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// A new open interval was appended. `standing` holds the day's
    /// work/break summary as it was before the append, when there was one.
    Started {
        date: NaiveDate,
        start: NaiveTime,
        standing: Option<WorkBreakSummary>,
    },

    /// The last interval was reopened; the gap since its stop disappears
    /// from break accounting.
    Resumed {
        date: NaiveDate,
        /// Start of the reopened interval.
        since: NaiveTime,
        /// Length of the gap that was just absorbed.
        absorbed_secs: i64,
    },

    /// The open interval was closed at `stop`.
    Stopped {
        date: NaiveDate,
        /// Start of the interval that was closed.
        since: NaiveTime,
        stop: NaiveTime,
        /// Work through `stop`, breaks from recorded gaps.
        summary: WorkBreakSummary,
    },

    /// The open interval was deleted for being too short to keep.
    Discarded {
        date: NaiveDate,
        start: NaiveTime,
        /// How long the interval had been open.
        length_secs: i64,
        /// The configured minimum it fell short of.
        min_secs: i64,
    },
}

/// Engine failures.
#[derive(Debug, Error)]
pub enum EngineError<E>
where
    E: std::error::Error + 'static,
{
    /// The store failed.
    #[error("store error")]
    Store(#[source] E),

    /// A recorded time is later than the time it is compared against.
    #[error(transparent)]
    ClockSkew(#[from] NegativeDuration),

    /// `start` was invoked while an entry is already open.
    #[error("cannot start a new entry when one is already open")]
    AlreadyStarted,

    /// `stop` was invoked with no open entry.
    #[error("cannot stop an entry when none is open")]
    NotStarted,

    /// The store affected a different number of rows than the engine
    /// expected, meaning the two have desynchronized.
    #[error("store desync during {action}: expected 1 affected entry, got {affected}")]
    Conflict { action: &'static str, affected: usize },
}

/// The interval state machine.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub const fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Toggles tracking: opens a new interval when none is open, otherwise
    /// closes (or discards) the open one.
    pub fn tick<S: EntryStore>(
        &self,
        store: &mut S,
        date: NaiveDate,
        now: NaiveTime,
    ) -> Result<TickOutcome, EngineError<S::Error>> {
        if store.has_open_entry(date).map_err(EngineError::Store)? {
            self.stop_flow(store, date, now)
        } else {
            self.start_flow(store, date, now)
        }
    }

    /// Starts tracking; fails if an entry is already open.
    pub fn start<S: EntryStore>(
        &self,
        store: &mut S,
        date: NaiveDate,
        now: NaiveTime,
    ) -> Result<TickOutcome, EngineError<S::Error>> {
        if store.has_open_entry(date).map_err(EngineError::Store)? {
            return Err(EngineError::AlreadyStarted);
        }
        self.start_flow(store, date, now)
    }

    /// Stops tracking; fails if no entry is open.
    pub fn stop<S: EntryStore>(
        &self,
        store: &mut S,
        date: NaiveDate,
        now: NaiveTime,
    ) -> Result<TickOutcome, EngineError<S::Error>> {
        if !store.has_open_entry(date).map_err(EngineError::Store)? {
            return Err(EngineError::NotStarted);
        }
        self.stop_flow(store, date, now)
    }

    /// Derives the day's status without mutating anything.
    pub fn status<S: EntryStore>(
        &self,
        store: &S,
        date: NaiveDate,
        now: NaiveTime,
    ) -> Result<DayStatus, EngineError<S::Error>> {
        let entries = store.list_entries(date).map_err(EngineError::Store)?;
        Ok(report::day_status(&entries, now)?)
    }

    fn start_flow<S: EntryStore>(
        &self,
        store: &mut S,
        date: NaiveDate,
        now: NaiveTime,
    ) -> Result<TickOutcome, EngineError<S::Error>> {
        let entries = store.list_entries(date).map_err(EngineError::Store)?;

        if let Some(last) = entries.last() {
            if let Some(stop) = last.stop {
                let gap_secs = seconds_between(stop, now)?;
                if gap_secs <= self.config.short_break_secs {
                    tracing::debug!(gap_secs, "gap within short-break threshold, reopening");
                    let affected = store.reopen_last_entry(date).map_err(EngineError::Store)?;
                    if affected != 1 {
                        return Err(EngineError::Conflict {
                            action: "reopen",
                            affected,
                        });
                    }
                    return Ok(TickOutcome::Resumed {
                        date,
                        since: last.start,
                        absorbed_secs: gap_secs,
                    });
                }
            }
        }

        // Summarize the day as it was, before the new interval exists.
        let standing = if entries.is_empty() {
            None
        } else {
            Some(report::start_summary(&entries, now)?)
        };

        tracing::debug!(%date, %now, "appending new open entry");
        let affected = store.append_entry(date, now).map_err(EngineError::Store)?;
        if affected != 1 {
            return Err(EngineError::Conflict {
                action: "append",
                affected,
            });
        }
        Ok(TickOutcome::Started {
            date,
            start: now,
            standing,
        })
    }

    fn stop_flow<S: EntryStore>(
        &self,
        store: &mut S,
        date: NaiveDate,
        now: NaiveTime,
    ) -> Result<TickOutcome, EngineError<S::Error>> {
        let entries = store.list_entries(date).map_err(EngineError::Store)?;
        let Some(current) = entries.last().filter(|entry| entry.is_open()) else {
            // has_open_entry said yes but the list disagrees.
            return Err(EngineError::Conflict {
                action: "close",
                affected: 0,
            });
        };

        let length_secs = seconds_between(current.start, now)?;
        if length_secs < self.config.min_interval_secs {
            tracing::debug!(length_secs, "entry shorter than minimum, discarding");
            let affected = store
                .discard_last_open_entry(date)
                .map_err(EngineError::Store)?;
            if affected != 1 {
                return Err(EngineError::Conflict {
                    action: "discard",
                    affected,
                });
            }
            return Ok(TickOutcome::Discarded {
                date,
                start: current.start,
                length_secs,
                min_secs: self.config.min_interval_secs,
            });
        }

        // Summarize before closing: afterwards there is no current interval
        // to query separately.
        let summary = report::summary(&entries, now)?;

        tracing::debug!(%date, %now, "closing open entry");
        let affected = store.close_entry(date, now).map_err(EngineError::Store)?;
        if affected != 1 {
            return Err(EngineError::Conflict {
                action: "close",
                affected,
            });
        }
        Ok(TickOutcome::Stopped {
            date,
            since: current.start,
            stop: now,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::Interval;
    use std::convert::Infallible;

    /// In-memory store for exercising the engine.
    #[derive(Debug, Default)]
    struct MemStore {
        entries: Vec<Interval>,
        next_id: i64,
    }

    impl MemStore {
        fn for_date(&self, date: NaiveDate) -> Vec<Interval> {
            self.entries
                .iter()
                .filter(|entry| entry.date == date)
                .copied()
                .collect()
        }

        fn last_index_for(&self, date: NaiveDate) -> Option<usize> {
            self.entries.iter().rposition(|entry| entry.date == date)
        }
    }

    impl EntryStore for MemStore {
        type Error = Infallible;

        fn has_open_entry(&self, date: NaiveDate) -> Result<bool, Self::Error> {
            Ok(self
                .entries
                .iter()
                .any(|entry| entry.date == date && entry.is_open()))
        }

        fn append_entry(&mut self, date: NaiveDate, start: NaiveTime) -> Result<usize, Self::Error> {
            self.next_id += 1;
            self.entries.push(Interval {
                id: self.next_id,
                date,
                start,
                stop: None,
            });
            Ok(1)
        }

        fn close_entry(&mut self, date: NaiveDate, stop: NaiveTime) -> Result<usize, Self::Error> {
            for entry in &mut self.entries {
                if entry.date == date && entry.is_open() {
                    entry.stop = Some(stop);
                    return Ok(1);
                }
            }
            Ok(0)
        }

        fn reopen_last_entry(&mut self, date: NaiveDate) -> Result<usize, Self::Error> {
            match self.last_index_for(date) {
                Some(index) => {
                    self.entries[index].stop = None;
                    Ok(1)
                }
                None => Ok(0),
            }
        }

        fn discard_last_open_entry(&mut self, date: NaiveDate) -> Result<usize, Self::Error> {
            match self.last_index_for(date) {
                Some(index) if self.entries[index].is_open() => {
                    self.entries.remove(index);
                    Ok(1)
                }
                _ => Ok(0),
            }
        }

        fn list_entries(&self, date: NaiveDate) -> Result<Vec<Interval>, Self::Error> {
            Ok(self.for_date(date))
        }
    }

    /// Store whose mutations report zero affected rows, simulating a
    /// desynchronized backend.
    #[derive(Debug, Default)]
    struct DesyncStore {
        inner: MemStore,
    }

    impl EntryStore for DesyncStore {
        type Error = Infallible;

        fn has_open_entry(&self, date: NaiveDate) -> Result<bool, Self::Error> {
            self.inner.has_open_entry(date)
        }

        fn append_entry(&mut self, _: NaiveDate, _: NaiveTime) -> Result<usize, Self::Error> {
            Ok(0)
        }

        fn close_entry(&mut self, _: NaiveDate, _: NaiveTime) -> Result<usize, Self::Error> {
            Ok(0)
        }

        fn reopen_last_entry(&mut self, _: NaiveDate) -> Result<usize, Self::Error> {
            Ok(0)
        }

        fn discard_last_open_entry(&mut self, _: NaiveDate) -> Result<usize, Self::Error> {
            Ok(0)
        }

        fn list_entries(&self, date: NaiveDate) -> Result<Vec<Interval>, Self::Error> {
            self.inner.list_entries(date)
        }
    }

    fn t(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn assert_at_most_one_open(store: &MemStore, date: NaiveDate) {
        let entries = store.for_date(date);
        let open_count = entries.iter().filter(|entry| entry.is_open()).count();
        assert!(open_count <= 1, "more than one open entry: {entries:?}");
        if open_count == 1 {
            assert!(
                entries.last().unwrap().is_open(),
                "open entry is not the last one: {entries:?}"
            );
        }
    }

    #[test]
    fn tick_opens_then_closes() {
        let engine = Engine::default();
        let mut store = MemStore::default();

        let outcome = engine.tick(&mut store, date(), t(9, 0, 0)).unwrap();
        assert!(matches!(outcome, TickOutcome::Started { standing: None, .. }));
        assert!(store.has_open_entry(date()).unwrap());
        assert_at_most_one_open(&store, date());

        let outcome = engine.tick(&mut store, date(), t(9, 2, 0)).unwrap();
        let TickOutcome::Stopped { since, stop, .. } = outcome else {
            panic!("expected Stopped, got {outcome:?}");
        };
        assert_eq!(since, t(9, 0, 0));
        assert_eq!(stop, t(9, 2, 0));
        assert!(!store.has_open_entry(date()).unwrap());
        assert_at_most_one_open(&store, date());
    }

    #[test]
    fn tick_discards_interval_shorter_than_minimum() {
        let engine = Engine::default();
        let mut store = MemStore::default();

        engine.tick(&mut store, date(), t(9, 0, 0)).unwrap();
        let outcome = engine.tick(&mut store, date(), t(9, 0, 30)).unwrap();

        let TickOutcome::Discarded {
            length_secs,
            min_secs,
            ..
        } = outcome
        else {
            panic!("expected Discarded, got {outcome:?}");
        };
        assert_eq!(length_secs, 30);
        assert_eq!(min_secs, 60);
        // Net no-op: the day's list is back to where it started.
        assert!(store.list_entries(date()).unwrap().is_empty());
    }

    #[test]
    fn tick_resumes_within_short_break_threshold() {
        let engine = Engine::default();
        let mut store = MemStore::default();

        engine.tick(&mut store, date(), t(9, 0, 0)).unwrap();
        engine.tick(&mut store, date(), t(9, 1, 5)).unwrap();
        let outcome = engine.tick(&mut store, date(), t(9, 1, 30)).unwrap();

        let TickOutcome::Resumed {
            since,
            absorbed_secs,
            ..
        } = outcome
        else {
            panic!("expected Resumed, got {outcome:?}");
        };
        assert_eq!(since, t(9, 0, 0));
        assert_eq!(absorbed_secs, 25);

        // Same single interval, original start, open again.
        let entries = store.list_entries(date()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].start, t(9, 0, 0));
        assert_eq!(entries[0].stop, None);
        assert_at_most_one_open(&store, date());
    }

    #[test]
    fn tick_appends_after_long_break() {
        let engine = Engine::default();
        let mut store = MemStore::default();

        engine.tick(&mut store, date(), t(9, 0, 0)).unwrap();
        engine.tick(&mut store, date(), t(9, 1, 5)).unwrap();
        let outcome = engine.tick(&mut store, date(), t(9, 3, 10)).unwrap();

        let TickOutcome::Started { standing, .. } = outcome else {
            panic!("expected Started, got {outcome:?}");
        };
        // The standing report covers the day so far, counting the gap being
        // ended as one more break.
        let standing = standing.expect("prior entries exist");
        assert_eq!(standing.work_minutes, 1);
        assert_eq!(standing.break_count, 1);

        engine.tick(&mut store, date(), t(9, 5, 0)).unwrap();
        let entries = store.list_entries(date()).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|entry| !entry.is_open()));
    }

    #[test]
    fn start_fails_when_entry_already_open() {
        let engine = Engine::default();
        let mut store = MemStore::default();

        engine.start(&mut store, date(), t(9, 0, 0)).unwrap();
        let err = engine.start(&mut store, date(), t(9, 5, 0)).unwrap_err();
        assert!(matches!(err, EngineError::AlreadyStarted));
    }

    #[test]
    fn stop_fails_when_no_entry_open() {
        let engine = Engine::default();
        let mut store = MemStore::default();

        let err = engine.stop(&mut store, date(), t(9, 0, 0)).unwrap_err();
        assert!(matches!(err, EngineError::NotStarted));
    }

    #[test]
    fn dates_are_tracked_independently() {
        let engine = Engine::default();
        let mut store = MemStore::default();
        let other = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();

        engine.tick(&mut store, date(), t(9, 0, 0)).unwrap();
        engine.tick(&mut store, other, t(10, 0, 0)).unwrap();

        assert!(store.has_open_entry(date()).unwrap());
        assert!(store.has_open_entry(other).unwrap());
        assert_eq!(store.list_entries(date()).unwrap().len(), 1);
        assert_eq!(store.list_entries(other).unwrap().len(), 1);
    }

    #[test]
    fn clock_skew_is_an_error_and_mutates_nothing() {
        let engine = Engine::default();
        let mut store = MemStore::default();

        engine.tick(&mut store, date(), t(9, 0, 0)).unwrap();
        let err = engine.tick(&mut store, date(), t(8, 59, 0)).unwrap_err();
        assert!(matches!(err, EngineError::ClockSkew(_)));

        // The open entry is untouched.
        let entries = store.list_entries(date()).unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].is_open());
    }

    #[test]
    fn desynchronized_store_is_a_typed_conflict() {
        let engine = Engine::default();
        let mut store = DesyncStore::default();

        let err = engine.tick(&mut store, date(), t(9, 0, 0)).unwrap_err();
        let EngineError::Conflict { action, affected } = err else {
            panic!("expected Conflict, got {err:?}");
        };
        assert_eq!(action, "append");
        assert_eq!(affected, 0);
    }

    #[test]
    fn status_does_not_mutate() {
        let engine = Engine::default();
        let mut store = MemStore::default();

        engine.tick(&mut store, date(), t(9, 0, 0)).unwrap();
        let before = store.list_entries(date()).unwrap();
        let status = engine.status(&store, date(), t(9, 45, 0)).unwrap();
        assert!(matches!(status, DayStatus::Working { .. }));
        assert_eq!(store.list_entries(date()).unwrap(), before);
    }
}
