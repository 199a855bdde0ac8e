use std::io;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tk_cli::commands::{report, start, status, stop, tick};
use tk_cli::{Cli, Commands, Config, SystemClock};
use tk_core::{Clock, Engine, EngineError};
use tk_db::{Database, DbError};

/// Load config and open the database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = Database::open(&config.database_path).context("failed to open database")?;
    Ok((db, config))
}

fn run(cli: &Cli) -> Result<()> {
    let (mut db, config) = open_database(cli.config.as_deref())?;
    let engine = Engine::new(config.engine_config());

    let clock = SystemClock;
    let today = clock.today();
    let now = clock.now();

    let mut stdout = io::stdout();
    match cli.command {
        Commands::Tick => tick::run(&mut stdout, &mut db, &engine, today, now),
        Commands::Status => status::run(&mut stdout, &db, &engine, today, now),
        Commands::Start => start::run(&mut stdout, &mut db, &engine, today, now),
        Commands::Stop => stop::run(&mut stdout, &mut db, &engine, today, now),
        Commands::Report => report::run(&mut stdout, &db, today, now),
    }
}

/// Distinct exit codes per failure class. Usage errors exit 2 via clap
/// before we get here.
fn exit_code(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<EngineError<DbError>>() {
        Some(EngineError::AlreadyStarted) => ExitCode::from(3),
        Some(EngineError::NotStarted) => ExitCode::from(4),
        _ => ExitCode::from(1),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            exit_code(&err)
        }
    }
}
