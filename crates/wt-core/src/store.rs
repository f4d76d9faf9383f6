//! The record store consumed by the summary engine.

use chrono::NaiveDate;

use crate::record::{AttendanceRecord, LeavePass};
use crate::types::{Schedule, ScheduleName};

/// A day's record together with its leave passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayEntry {
    pub record: AttendanceRecord,
    pub leave_passes: Vec<LeavePass>,
}

/// Source of schedules, attendance records and leave passes.
///
/// This trait lets the engine run against different storage backends
/// (e.g., `Database` from wt-db, or in-memory test fixtures).
pub trait RecordStore {
    /// Error raised by the backend.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Looks up a schedule by name.
    fn schedule(&self, name: &ScheduleName) -> Result<Option<Schedule>, Self::Error>;

    /// The schedule of the most recent record strictly before `date`.
    fn schedule_before(&self, date: NaiveDate) -> Result<Option<Schedule>, Self::Error>;

    /// Records with `from <= date <= to`, ascending by date.
    fn records(&self, from: NaiveDate, to: NaiveDate)
    -> Result<Vec<AttendanceRecord>, Self::Error>;

    /// Leave passes of `date`, ascending by id.
    fn leave_passes(&self, date: NaiveDate) -> Result<Vec<LeavePass>, Self::Error>;

    /// The configured fallback schedule. Fixed for the lifetime of the store.
    fn default_schedule(&self) -> &Schedule;

    /// Records in `[from, to]` with their leave passes.
    ///
    /// Backends that can read the whole range from one consistent snapshot
    /// should override this; the default issues one query per day.
    fn day_entries(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<DayEntry>, Self::Error> {
        self.records(from, to)?
            .into_iter()
            .map(|record| {
                let leave_passes = self.leave_passes(record.date())?;
                Ok(DayEntry {
                    record,
                    leave_passes,
                })
            })
            .collect()
    }

    /// Schedule for a new record on `date`: the one in effect on the most
    /// recent earlier record, else the default.
    fn schedule_for_new_record(&self, date: NaiveDate) -> Result<Schedule, Self::Error> {
        Ok(self
            .schedule_before(date)?
            .unwrap_or_else(|| self.default_schedule().clone()))
    }
}
