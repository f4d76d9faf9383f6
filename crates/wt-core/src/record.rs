//! Per-day attendance data: the day's record and its leave passes.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::time::{TimeInterval, TimeOfDay};
use crate::types::{ScheduleName, ValidationError, forward_interval};

/// One calendar day's schedule assignment plus actual check-in/check-out.
///
/// The date is the natural key. The schedule is referenced by name and
/// resolved against the record store when a summary is computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceRecord {
    date: NaiveDate,
    schedule: ScheduleName,
    check_in: TimeOfDay,
    check_out: TimeOfDay,
}

impl AttendanceRecord {
    /// Creates a record; check-in must be strictly before check-out.
    pub fn new(
        date: NaiveDate,
        schedule: ScheduleName,
        check_in: TimeOfDay,
        check_out: TimeOfDay,
    ) -> Result<Self, ValidationError> {
        forward_interval("attendance", TimeInterval::new(check_in, check_out))?;
        Ok(Self {
            date,
            schedule,
            check_in,
            check_out,
        })
    }

    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    pub const fn schedule(&self) -> &ScheduleName {
        &self.schedule
    }

    pub const fn check_in(&self) -> TimeOfDay {
        self.check_in
    }

    pub const fn check_out(&self) -> TimeOfDay {
        self.check_out
    }

    /// The span actually spent at work.
    pub const fn attendance(&self) -> TimeInterval {
        TimeInterval::new(self.check_in, self.check_out)
    }

    /// Returns a copy with a different check-in, validated.
    pub fn with_check_in(&self, check_in: TimeOfDay) -> Result<Self, ValidationError> {
        Self::new(self.date, self.schedule.clone(), check_in, self.check_out)
    }

    /// Returns a copy with a different check-out, validated.
    pub fn with_check_out(&self, check_out: TimeOfDay) -> Result<Self, ValidationError> {
        Self::new(self.date, self.schedule.clone(), self.check_in, check_out)
    }

    /// Returns a copy assigned to another schedule.
    #[must_use]
    pub fn with_schedule(&self, schedule: ScheduleName) -> Self {
        Self {
            schedule,
            ..self.clone()
        }
    }
}

impl fmt::Display for AttendanceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.date,
            self.schedule,
            self.attendance()
        )
    }
}

/// An absence during the working day, counted as debt.
///
/// `id` is sequential per date, starting at 0 in insertion order; it is not
/// a global identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeavePass {
    date: NaiveDate,
    id: u32,
    from: TimeOfDay,
    to: TimeOfDay,
    comment: String,
}

impl LeavePass {
    /// Creates a leave pass; `from` must be strictly before `to`.
    pub fn new(
        date: NaiveDate,
        id: u32,
        from: TimeOfDay,
        to: TimeOfDay,
        comment: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        forward_interval("leave pass", TimeInterval::new(from, to))?;
        Ok(Self {
            date,
            id,
            from,
            to,
            comment: comment.into(),
        })
    }

    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    pub const fn id(&self) -> u32 {
        self.id
    }

    pub const fn from(&self) -> TimeOfDay {
        self.from
    }

    pub const fn to(&self) -> TimeOfDay {
        self.to
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub const fn interval(&self) -> TimeInterval {
        TimeInterval::new(self.from, self.to)
    }

    /// Returns a copy starting at `from`, validated.
    pub fn with_from(&self, from: TimeOfDay) -> Result<Self, ValidationError> {
        Self::new(self.date, self.id, from, self.to, self.comment.clone())
    }

    /// Returns a copy ending at `to`, validated.
    pub fn with_to(&self, to: TimeOfDay) -> Result<Self, ValidationError> {
        Self::new(self.date, self.id, self.from, to, self.comment.clone())
    }

    #[must_use]
    pub fn with_comment(&self, comment: impl Into<String>) -> Self {
        Self {
            comment: comment.into(),
            ..self.clone()
        }
    }
}

impl fmt::Display for LeavePass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{} {}", self.date, self.id, self.interval())?;
        if !self.comment.is_empty() {
            write!(f, " ({})", self.comment)?;
        }
        Ok(())
    }
}
