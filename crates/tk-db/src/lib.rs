//! Storage layer for the timekeeper.
//!
//! Provides persistence for work intervals using `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but
//! not `Sync`: a `Database` can be moved between threads but not shared
//! without external synchronization. The CLI is single-threaded and holds
//! one connection for the life of the process; concurrent invocations are
//! serialized by SQLite itself, not by this crate.
//!
//! # Schema
//!
//! Intervals are stored as TEXT: `date` as `2024-01-15`, times as
//! `10:30:00`. Lexicographic ordering matches chronological ordering within
//! a day, values stay human-readable in the database, and `id` preserves
//! insertion order, so "the most recent entry" is always `MAX(id)` for a
//! date. An open interval is a row with `stop IS NULL`; the engine
//! guarantees at most one per date.

use std::path::Path;

use chrono::{NaiveDate, NaiveTime};
use rusqlite::{Connection, params};
use thiserror::Error;

use tk_core::{EntryStore, Interval};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Failed to parse a stored date.
    #[error("invalid date for entry {entry_id}: {value}")]
    DateParse {
        entry_id: i64,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    /// Failed to parse a stored time-of-day.
    #[error("invalid time for entry {entry_id}: {value}")]
    TimeParse {
        entry_id: i64,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection
    /// closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        tracing::debug!("ensuring time_entries table exists");
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS time_entries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                start TEXT NOT NULL,
                stop TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_time_entries_date ON time_entries(date);
            ",
        )?;
        Ok(())
    }

    fn parse_row(
        id: i64,
        date: &str,
        start: &str,
        stop: Option<&str>,
    ) -> Result<Interval, DbError> {
        let date = NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|source| {
            DbError::DateParse {
                entry_id: id,
                value: date.to_string(),
                source,
            }
        })?;
        let start = NaiveTime::parse_from_str(start, TIME_FORMAT).map_err(|source| {
            DbError::TimeParse {
                entry_id: id,
                value: start.to_string(),
                source,
            }
        })?;
        let stop = match stop {
            Some(value) => Some(NaiveTime::parse_from_str(value, TIME_FORMAT).map_err(
                |source| DbError::TimeParse {
                    entry_id: id,
                    value: value.to_string(),
                    source,
                },
            )?),
            None => None,
        };
        Ok(Interval {
            id,
            date,
            start,
            stop,
        })
    }
}

impl EntryStore for Database {
    type Error = DbError;

    fn has_open_entry(&self, date: NaiveDate) -> Result<bool, DbError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM time_entries WHERE date = ?1 AND stop IS NULL",
            params![date.format(DATE_FORMAT).to_string()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn append_entry(&mut self, date: NaiveDate, start: NaiveTime) -> Result<usize, DbError> {
        let affected = self.conn.execute(
            "INSERT INTO time_entries (date, start) VALUES (?1, ?2)",
            params![
                date.format(DATE_FORMAT).to_string(),
                start.format(TIME_FORMAT).to_string()
            ],
        )?;
        Ok(affected)
    }

    fn close_entry(&mut self, date: NaiveDate, stop: NaiveTime) -> Result<usize, DbError> {
        let affected = self.conn.execute(
            "UPDATE time_entries SET stop = ?1 WHERE date = ?2 AND stop IS NULL",
            params![
                stop.format(TIME_FORMAT).to_string(),
                date.format(DATE_FORMAT).to_string()
            ],
        )?;
        Ok(affected)
    }

    fn reopen_last_entry(&mut self, date: NaiveDate) -> Result<usize, DbError> {
        let affected = self.conn.execute(
            "UPDATE time_entries SET stop = NULL
             WHERE id = (SELECT MAX(id) FROM time_entries WHERE date = ?1)",
            params![date.format(DATE_FORMAT).to_string()],
        )?;
        Ok(affected)
    }

    fn discard_last_open_entry(&mut self, date: NaiveDate) -> Result<usize, DbError> {
        let affected = self.conn.execute(
            "DELETE FROM time_entries
             WHERE id = (SELECT MAX(id) FROM time_entries WHERE date = ?1 AND stop IS NULL)",
            params![date.format(DATE_FORMAT).to_string()],
        )?;
        Ok(affected)
    }

    fn list_entries(&self, date: NaiveDate) -> Result<Vec<Interval>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, date, start, stop FROM time_entries WHERE date = ?1 ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![date.format(DATE_FORMAT).to_string()], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
            ))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (id, date, start, stop) = row?;
            entries.push(Self::parse_row(id, &date, &start, stop.as_deref())?);
        }
        Ok(entries)
    }
}
