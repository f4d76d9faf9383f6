//! `wt check-in` and `wt check-out`.
//!
//! For a single day without a record, the record is created with the given
//! time and the other end taken from its schedule. Otherwise the existing
//! records of the range are amended.

use std::io::Write;

use anyhow::Result;
use chrono::NaiveDate;
use wt_core::{RecordStore, TimeOfDay};
use wt_db::Database;

/// Sets the arrival time on `from` (or every record in `[from, to]`).
pub fn check_in<W: Write>(
    writer: &mut W,
    db: &mut Database,
    time: TimeOfDay,
    from: NaiveDate,
    to: Option<NaiveDate>,
) -> Result<()> {
    if to.is_none() && db.record(from)?.is_none() {
        let schedule = db.schedule_for_new_record(from)?;
        let record = db.insert_record_with(from, time, schedule.end(), Some(schedule.name()))?;
        writeln!(writer, "Checked in: {record}")?;
        return Ok(());
    }

    let updated = db.set_check_in(time, from, to)?;
    writeln!(writer, "Check-in set to {time} on {updated} record(s).")?;
    Ok(())
}

/// Sets the leaving time on `from` (or every record in `[from, to]`).
pub fn check_out<W: Write>(
    writer: &mut W,
    db: &mut Database,
    time: TimeOfDay,
    from: NaiveDate,
    to: Option<NaiveDate>,
) -> Result<()> {
    if to.is_none() && db.record(from)?.is_none() {
        let schedule = db.schedule_for_new_record(from)?;
        let record = db.insert_record_with(from, schedule.begin(), time, Some(schedule.name()))?;
        writeln!(writer, "Checked out: {record}")?;
        return Ok(());
    }

    let updated = db.set_check_out(time, from, to)?;
    writeln!(writer, "Check-out set to {time} on {updated} record(s).")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use wt_core::Schedule;
    use wt_db::DbError;

    fn open() -> Database {
        Database::open_in_memory(Schedule::default()).unwrap()
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 1, day).unwrap()
    }

    fn hm(hour: u32, minute: u32) -> TimeOfDay {
        TimeOfDay::from_hm(hour, minute)
    }

    #[test]
    fn check_in_then_out_on_new_day() {
        let mut db = open();
        let mut output = Vec::new();
        check_in(&mut output, &mut db, hm(8, 45), date(18), None).unwrap();
        check_out(&mut output, &mut db, hm(17, 20), date(18), None).unwrap();
        check_out(&mut output, &mut db, hm(16, 0), date(19), None).unwrap();

        assert_snapshot!(String::from_utf8(output).unwrap(), @r"
        Checked in: 2022-01-18 [default] 08:45:00 - 17:00:00
        Check-out set to 17:20:00 on 1 record(s).
        Checked out: 2022-01-19 [default] 08:00:00 - 16:00:00
        ");
    }

    #[test]
    fn check_in_over_range() {
        let mut db = open();
        for day in 17..=19 {
            db.insert_record(date(day)).unwrap();
        }
        let mut output = Vec::new();
        check_in(&mut output, &mut db, hm(9, 30), date(19), Some(date(17))).unwrap();
        assert_snapshot!(String::from_utf8(output).unwrap(), @"Check-in set to 09:30:00 on 3 record(s).");
    }

    #[test]
    fn check_in_after_schedule_end_on_new_day_fails() {
        let mut db = open();
        let mut output = Vec::new();
        assert!(check_in(&mut output, &mut db, hm(18, 0), date(18), None).is_err());
        assert_eq!(db.record(date(18)).unwrap(), None);

        let err = check_out(&mut output, &mut db, hm(18, 0), date(1), Some(date(5))).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DbError>(),
            Some(DbError::NoRecordsInRange { .. })
        ));
    }
}
