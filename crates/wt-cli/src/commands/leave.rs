//! Leave pass commands: `wt leave add|list|edit`.

use std::io::Write;

use anyhow::{Result, bail};
use chrono::NaiveDate;
use wt_core::{LeavePass, RecordStore, TimeOfDay};
use wt_db::Database;

/// Adds a leave pass to `date`.
pub fn add<W: Write>(
    writer: &mut W,
    db: &mut Database,
    date: NaiveDate,
    from: TimeOfDay,
    to: TimeOfDay,
    comment: &str,
) -> Result<()> {
    let pass = db.insert_leave_pass(date, from, to, comment)?;
    writeln!(writer, "Added leave pass {pass}")?;
    Ok(())
}

/// Lists the leave passes of `date`.
pub fn list<W: Write>(writer: &mut W, db: &Database, date: NaiveDate) -> Result<()> {
    let passes = db.leave_passes(date)?;
    if passes.is_empty() {
        writeln!(writer, "No leave passes on {date}.")?;
        return Ok(());
    }

    writeln!(writer, "Leave passes on {date}:")?;
    for pass in &passes {
        write_leave_pass(writer, pass)?;
    }
    Ok(())
}

/// Changes any of the times or the comment of leave pass `id`.
pub fn edit<W: Write>(
    writer: &mut W,
    db: &mut Database,
    date: NaiveDate,
    id: u32,
    from: Option<TimeOfDay>,
    to: Option<TimeOfDay>,
    comment: Option<&str>,
) -> Result<()> {
    if from.is_none() && to.is_none() && comment.is_none() {
        bail!("nothing to change: pass --from, --to or --comment");
    }

    let updated = db.update_leave_pass(date, id, from, to, comment)?;
    writeln!(writer, "Updated leave pass {updated}")?;
    Ok(())
}

/// Writes one indented `#id  from - to  comment` line.
pub(crate) fn write_leave_pass<W: Write>(writer: &mut W, pass: &LeavePass) -> Result<()> {
    write!(writer, "  #{}  {}", pass.id(), pass.interval())?;
    if !pass.comment().is_empty() {
        write!(writer, "  {}", pass.comment())?;
    }
    writeln!(writer)?;
    Ok(())
}
