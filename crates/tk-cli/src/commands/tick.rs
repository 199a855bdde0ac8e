//! Tick command: toggle between working and on a break.

use std::io::Write;

use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};

use tk_core::{Engine, render_outcome};
use tk_db::Database;

pub fn run<W: Write>(
    writer: &mut W,
    db: &mut Database,
    engine: &Engine,
    date: NaiveDate,
    now: NaiveTime,
) -> Result<()> {
    let outcome = engine.tick(db, date, now)?;
    for line in render_outcome(&outcome) {
        writeln!(writer, "{line}")?;
    }
    Ok(())
}
