use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use wt_cli::commands::{attendance, leave, record, schedule, summary};
use wt_cli::{Cli, Commands, Config, LeaveAction, RecordAction, ScheduleAction};
use wt_core::{TimeInterval, TimeOfDay};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<wt_db::Database> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    wt_db::Database::open(&config.database_path, config.default_schedule)
        .with_context(|| format!("failed to open {}", config.database_path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let Some(command) = cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let today = Local::now().date_naive();
    let day = |date: Option<NaiveDate>| date.unwrap_or(today);
    let mut db = open_database(cli.config.as_deref())?;
    let mut out = std::io::stdout().lock();

    match command {
        Commands::Schedule(action) => match action {
            ScheduleAction::Add {
                name,
                begin,
                end,
                lunch_begin,
                lunch_end,
            } => schedule::add(
                &mut out,
                &mut db,
                &name,
                TimeInterval::new(begin, end),
                TimeInterval::new(lunch_begin, lunch_end),
            )?,
            ScheduleAction::List => schedule::list(&mut out, &db)?,
            ScheduleAction::Assign { name, from, to } => {
                schedule::assign(&mut out, &mut db, &name, day(from), to)?;
            }
        },
        Commands::Record(action) => match action {
            RecordAction::Add {
                date,
                check_in,
                check_out,
                schedule,
            } => record::add(
                &mut out,
                &mut db,
                day(date),
                check_in,
                check_out,
                schedule.as_deref(),
            )?,
            RecordAction::Show { date } => record::show(&mut out, &db, day(date))?,
            RecordAction::List { from, to } => record::list(&mut out, &db, day(from), to)?,
        },
        Commands::CheckIn { time, date, to } => attendance::check_in(
            &mut out,
            &mut db,
            time.unwrap_or_else(TimeOfDay::now),
            day(date),
            to,
        )?,
        Commands::CheckOut { time, date, to } => attendance::check_out(
            &mut out,
            &mut db,
            time.unwrap_or_else(TimeOfDay::now),
            day(date),
            to,
        )?,
        Commands::Leave(action) => match action {
            LeaveAction::Add {
                from,
                to,
                date,
                comment,
            } => leave::add(&mut out, &mut db, day(date), from, to, &comment)?,
            LeaveAction::List { date } => leave::list(&mut out, &db, day(date))?,
            LeaveAction::Edit {
                id,
                date,
                from,
                to,
                comment,
            } => leave::edit(
                &mut out,
                &mut db,
                day(date),
                id,
                from,
                to,
                comment.as_deref(),
            )?,
        },
        Commands::Summary {
            from,
            to,
            month,
            year,
            json,
        } => {
            let period = summary::Period::from_args(from, to, month, year, today);
            summary::run(&mut out, &db, period, today, json)?;
        }
    }

    Ok(())
}
