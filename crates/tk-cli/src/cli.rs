//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Personal work-interval tracker.
///
/// Records start/stop timestamps per calendar day in a local SQLite database
/// and derives human-readable status and summary reports.
#[derive(Debug, Parser)]
#[command(name = "tk", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Toggle tracking: open a new interval or close the open one.
    ///
    /// Closing an interval shorter than the configured minimum discards it;
    /// reopening within the short-break threshold merges the gap away.
    Tick,

    /// Show whether you are working or on a break, with today's totals.
    Status,

    /// Open a new interval; fails if one is already open.
    Start,

    /// Close the open interval; fails if none is open.
    Stop,

    /// Print today's work/break summary.
    Report,
}
