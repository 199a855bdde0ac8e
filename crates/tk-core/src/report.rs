//! Work/break aggregation and its textual rendering.
//!
//! Durations are aggregated in whole minutes per interval and per gap,
//! matching what the store records (seconds precision) truncated for
//! display. Rendering produces the exact lines the CLI prints.

use chrono::{NaiveDate, NaiveTime};

use crate::duration::{
    NegativeDuration, format_duration, format_elapsed, minutes_between, seconds_between,
};
use crate::engine::TickOutcome;
use crate::interval::Interval;

/// Aggregated work and break figures for one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkBreakSummary {
    /// Total minutes worked.
    pub work_minutes: i64,

    /// Number of breaks between intervals.
    pub break_count: usize,

    /// Total minutes spent on those breaks.
    pub break_minutes: i64,
}

/// What the day currently looks like, derived without mutating anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayStatus {
    /// No intervals recorded yet.
    Empty,
    /// The last interval is open.
    Working {
        since: NaiveTime,
        elapsed_secs: i64,
        summary: WorkBreakSummary,
    },
    /// The last interval is closed.
    OnBreak {
        since: NaiveTime,
        elapsed_secs: i64,
        summary: WorkBreakSummary,
    },
}

/// Total minutes worked, counting an open last interval through `now`.
pub fn work_minutes(entries: &[Interval], now: NaiveTime) -> Result<i64, NegativeDuration> {
    let mut total = 0;
    for entry in entries {
        let end = entry.stop.unwrap_or(now);
        total += minutes_between(entry.start, end)?;
    }
    Ok(total)
}

/// Break count and total break minutes over adjacent interval pairs.
pub fn break_stats(entries: &[Interval]) -> Result<(usize, i64), NegativeDuration> {
    let mut count = 0;
    let mut minutes = 0;
    for pair in entries.windows(2) {
        // Only the last interval can be open, so every pair boundary has a
        // stop; an absent one means the list predates persistence and is
        // skipped rather than counted as a zero-length break.
        let Some(stop) = pair[0].stop else { continue };
        minutes += minutes_between(stop, pair[1].start)?;
        count += 1;
    }
    Ok((count, minutes))
}

/// Standing summary: work through `now`, breaks from recorded gaps only.
pub fn summary(entries: &[Interval], now: NaiveTime) -> Result<WorkBreakSummary, NegativeDuration> {
    let (break_count, break_minutes) = break_stats(entries)?;
    Ok(WorkBreakSummary {
        work_minutes: work_minutes(entries, now)?,
        break_count,
        break_minutes,
    })
}

/// Start-report variant of [`summary`].
///
/// When the last interval is closed the user is mid-break, so the gap from
/// that stop to `now` counts as one more break when it is positive.
pub fn start_summary(
    entries: &[Interval],
    now: NaiveTime,
) -> Result<WorkBreakSummary, NegativeDuration> {
    let mut summary = summary(entries, now)?;
    if let Some(stop) = entries.last().and_then(|last| last.stop) {
        if seconds_between(stop, now)? > 0 {
            summary.break_count += 1;
            summary.break_minutes += minutes_between(stop, now)?;
        }
    }
    Ok(summary)
}

/// Derives the current [`DayStatus`] from the day's intervals.
pub fn day_status(entries: &[Interval], now: NaiveTime) -> Result<DayStatus, NegativeDuration> {
    let Some(last) = entries.last() else {
        return Ok(DayStatus::Empty);
    };
    let summary = summary(entries, now)?;
    match last.stop {
        None => Ok(DayStatus::Working {
            since: last.start,
            elapsed_secs: seconds_between(last.start, now)?,
            summary,
        }),
        Some(stop) => Ok(DayStatus::OnBreak {
            since: stop,
            elapsed_secs: seconds_between(stop, now)?,
            summary,
        }),
    }
}

/// Renders the standing summary: the work line always precedes the break line.
pub fn render_summary(summary: &WorkBreakSummary) -> Vec<String> {
    let work = format_duration(summary.work_minutes * 60);
    let breaks = if summary.break_count == 0 {
        "No breaks taken yet".to_string()
    } else {
        format!(
            "Breaks: {} ({} minutes)",
            summary.break_count, summary.break_minutes
        )
    };
    vec![format!("Today's work duration: {work}"), breaks]
}

/// Renders the status report for `date`.
pub fn render_status(date: NaiveDate, status: &DayStatus) -> Vec<String> {
    match status {
        DayStatus::Empty => vec![format!("No entries for today ({date}).")],
        DayStatus::Working {
            since,
            elapsed_secs,
            summary,
        } => {
            let mut lines = vec![format!(
                "Working since: {since} ({})",
                format_elapsed(*elapsed_secs)
            )];
            lines.extend(render_summary(summary));
            lines
        }
        DayStatus::OnBreak {
            since,
            elapsed_secs,
            summary,
        } => {
            let mut lines = vec![format!(
                "On a break since: {since} ({})",
                format_elapsed(*elapsed_secs)
            )];
            lines.extend(render_summary(summary));
            lines
        }
    }
}

/// Renders the lines for a tick outcome.
///
/// Reports derived from the pre-mutation state precede the confirmation
/// line, so the user sees the day's accumulated state at the moment the
/// interval changed.
pub fn render_outcome(outcome: &TickOutcome) -> Vec<String> {
    match outcome {
        TickOutcome::Started {
            date,
            start,
            standing,
        } => {
            let mut lines = Vec::new();
            if let Some(standing) = standing {
                lines.extend(render_summary(standing));
            }
            lines.push(format!("Started at [{date} {start}]"));
            lines
        }
        TickOutcome::Resumed {
            date,
            since,
            absorbed_secs,
        } => {
            vec![format!(
                "Resumed entry started at [{date} {since}] (absorbed a {} break)",
                format_duration(*absorbed_secs)
            )]
        }
        TickOutcome::Stopped {
            date,
            since,
            stop,
            summary,
        } => {
            let mut lines = vec![format!("Working since: {since}")];
            lines.extend(render_summary(summary));
            lines.push(format!("Stopped at [{date} {stop}]"));
            lines
        }
        TickOutcome::Discarded {
            date,
            start,
            length_secs,
            min_secs,
        } => {
            vec![format!(
                "Discarded entry started at [{date} {start}]: {} is shorter than the {} minimum",
                format_duration(*length_secs),
                format_duration(*min_secs)
            )]
        }
    }
}
