//! Status command: report the current working/break state without mutating.

use std::io::Write;

use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};

use tk_core::{Engine, render_status};
use tk_db::Database;

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    engine: &Engine,
    date: NaiveDate,
    now: NaiveTime,
) -> Result<()> {
    let status = engine.status(db, date, now)?;
    for line in render_status(date, &status) {
        writeln!(writer, "{line}")?;
    }
    Ok(())
}
