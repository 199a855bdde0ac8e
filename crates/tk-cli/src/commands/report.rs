//! Report command: today's standing work/break summary.

use std::io::Write;

use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};

use tk_core::{EntryStore, render_summary, report};
use tk_db::Database;

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    date: NaiveDate,
    now: NaiveTime,
) -> Result<()> {
    let entries = db.list_entries(date)?;
    if entries.is_empty() {
        writeln!(writer, "No entries for today ({date}).")?;
        return Ok(());
    }

    let summary = report::summary(&entries, now)?;
    for line in render_summary(&summary) {
        writeln!(writer, "{line}")?;
    }
    Ok(())
}
