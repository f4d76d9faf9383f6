//! Schedule commands: `wt schedule add|list|assign`.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use wt_core::{Schedule, ScheduleName, TimeInterval};
use wt_db::Database;

/// Adds a new schedule.
pub fn add<W: Write>(
    writer: &mut W,
    db: &mut Database,
    name: &str,
    working: TimeInterval,
    lunch: TimeInterval,
) -> Result<()> {
    let schedule = Schedule::new(name, working, lunch).context("invalid schedule")?;
    db.insert_schedule(&schedule)?;
    writeln!(writer, "Added schedule {schedule}")?;
    Ok(())
}

/// Lists all schedules.
pub fn list<W: Write>(writer: &mut W, db: &Database) -> Result<()> {
    let schedules = db.schedules()?;

    writeln!(writer, "{:<12}  {:<8}  {:<8}  Lunch", "Name", "Begin", "End")?;
    writeln!(
        writer,
        "────────────  ────────  ────────  ───────────────────"
    )?;
    for schedule in schedules {
        writeln!(
            writer,
            "{:<12}  {:<8}  {:<8}  {}",
            schedule.name().as_str(),
            schedule.begin().to_string(),
            schedule.end().to_string(),
            schedule.lunch()
        )?;
    }
    Ok(())
}

/// Assigns a schedule to every record in `[from, to]`.
pub fn assign<W: Write>(
    writer: &mut W,
    db: &mut Database,
    name: &str,
    from: NaiveDate,
    to: Option<NaiveDate>,
) -> Result<()> {
    let name = ScheduleName::new(name)?;
    let updated = db.set_schedule(&name, from, to)?;
    writeln!(writer, "Assigned schedule {name} to {updated} record(s).")?;
    Ok(())
}
