//! Attendance record commands: `wt record add|show|list`.

use std::io::Write;

use anyhow::Result;
use chrono::NaiveDate;
use wt_core::summary::normalize_range;
use wt_core::{RecordStore, ScheduleName, TimeOfDay};
use wt_db::{Database, DbError};

use super::leave::write_leave_pass;

/// Creates the record of `date`.
///
/// Missing times default to the hours of the record's schedule.
pub fn add<W: Write>(
    writer: &mut W,
    db: &mut Database,
    date: NaiveDate,
    check_in: Option<TimeOfDay>,
    check_out: Option<TimeOfDay>,
    schedule: Option<&str>,
) -> Result<()> {
    let record = if check_in.is_none() && check_out.is_none() && schedule.is_none() {
        db.insert_record(date)?
    } else {
        let schedule = match schedule {
            Some(name) => {
                let name = ScheduleName::new(name)?;
                db.schedule(&name)?.ok_or(DbError::UnknownSchedule(name))?
            }
            None => db.schedule_for_new_record(date)?,
        };
        db.insert_record_with(
            date,
            check_in.unwrap_or(schedule.begin()),
            check_out.unwrap_or(schedule.end()),
            Some(schedule.name()),
        )?
    };
    writeln!(writer, "Added record {record}")?;
    Ok(())
}

/// Shows the record of `date` with its schedule and leave passes.
pub fn show<W: Write>(writer: &mut W, db: &Database, date: NaiveDate) -> Result<()> {
    let Some(record) = db.record(date)? else {
        writeln!(writer, "No record for {date}.")?;
        return Ok(());
    };

    writeln!(writer, "Date:      {date}")?;
    match db.schedule(record.schedule())? {
        Some(schedule) => writeln!(writer, "Schedule:  {schedule}")?,
        None => writeln!(writer, "Schedule:  {} (unknown)", record.schedule())?,
    }
    writeln!(writer, "Check-in:  {}", record.check_in())?;
    writeln!(writer, "Check-out: {}", record.check_out())?;

    let passes = db.leave_passes(date)?;
    if passes.is_empty() {
        writeln!(writer, "Leave passes: none")?;
    } else {
        writeln!(writer, "Leave passes:")?;
        for pass in &passes {
            write_leave_pass(writer, pass)?;
        }
    }
    Ok(())
}

/// Lists records in `[from, to]`.
pub fn list<W: Write>(
    writer: &mut W,
    db: &Database,
    from: NaiveDate,
    to: Option<NaiveDate>,
) -> Result<()> {
    let (from, to) = normalize_range(from, to);
    let records = db.records(from, to)?;
    if records.is_empty() {
        writeln!(writer, "No records between {from} and {to}.")?;
        return Ok(());
    }

    writeln!(
        writer,
        "{:<10}  {:<12}  {:<8}  Check-out",
        "Date", "Schedule", "Check-in"
    )?;
    writeln!(writer, "──────────  ────────────  ────────  ─────────")?;
    for record in records {
        writeln!(
            writer,
            "{:<10}  {:<12}  {:<8}  {}",
            record.date().to_string(),
            record.schedule().as_str(),
            record.check_in().to_string(),
            record.check_out()
        )?;
    }
    Ok(())
}
