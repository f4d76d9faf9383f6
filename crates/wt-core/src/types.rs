//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::time::{TimeInterval, TimeOfDay};

/// Name under which the fallback schedule is stored.
pub const DEFAULT_SCHEDULE_NAME: &str = "default";

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// An interval was invalid, degenerate or inverted.
    #[error("{field} must run forward in time, got {interval}")]
    InvalidInterval {
        field: &'static str,
        interval: TimeInterval,
    },

    /// The lunch window is not inside the working hours.
    #[error("lunch {lunch} is outside working hours {working}")]
    LunchOutsideWorkingHours {
        working: TimeInterval,
        lunch: TimeInterval,
    },
}

/// Checks that `interval` is valid and not inverted.
pub(crate) fn forward_interval(
    field: &'static str,
    interval: TimeInterval,
) -> Result<TimeInterval, ValidationError> {
    if !interval.is_valid() || interval.is_inverted() {
        return Err(ValidationError::InvalidInterval { field, interval });
    }
    Ok(interval)
}

/// A validated schedule name.
///
/// Schedule names must be non-empty. They are the natural key of a schedule
/// and are how attendance records refer to one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ScheduleName(String);

impl ScheduleName {
    /// Creates a new name after validation.
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::Empty {
                field: "schedule name",
            });
        }
        Ok(Self(name))
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ScheduleName {
    fn default() -> Self {
        Self(DEFAULT_SCHEDULE_NAME.to_string())
    }
}

impl TryFrom<String> for ScheduleName {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ScheduleName> for String {
    fn from(name: ScheduleName) -> Self {
        name.0
    }
}

impl fmt::Display for ScheduleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ScheduleName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A named working window with a lunch break inside it.
///
/// Both windows run forward in time and the working window contains the lunch
/// window. Schedules are immutable: changing hours means creating a new name.
///
/// The lunch window is validated but not deducted from worked time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ScheduleRepr", into = "ScheduleRepr")]
pub struct Schedule {
    name: ScheduleName,
    working: TimeInterval,
    lunch: TimeInterval,
}

impl Schedule {
    pub fn new(
        name: impl Into<String>,
        working: TimeInterval,
        lunch: TimeInterval,
    ) -> Result<Self, ValidationError> {
        let name = ScheduleName::new(name)?;
        let working = forward_interval("working hours", working)?;
        let lunch = forward_interval("lunch", lunch)?;
        if !working.contains(&lunch) {
            return Err(ValidationError::LunchOutsideWorkingHours { working, lunch });
        }
        Ok(Self {
            name,
            working,
            lunch,
        })
    }

    pub const fn name(&self) -> &ScheduleName {
        &self.name
    }

    pub const fn working_hours(&self) -> TimeInterval {
        self.working
    }

    pub const fn lunch(&self) -> TimeInterval {
        self.lunch
    }

    pub const fn begin(&self) -> TimeOfDay {
        self.working.begin
    }

    pub const fn end(&self) -> TimeOfDay {
        self.working.end
    }
}

/// 08:00-17:00 with lunch at 12:00-13:00.
impl Default for Schedule {
    fn default() -> Self {
        Self {
            name: ScheduleName::default(),
            working: TimeInterval::from_hm(8, 0, 17, 0),
            lunch: TimeInterval::from_hm(12, 0, 13, 0),
        }
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, lunch {})", self.name, self.working, self.lunch)
    }
}

/// Flat serialized form of [`Schedule`], validated on the way in.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScheduleRepr {
    name: String,
    begin: TimeOfDay,
    end: TimeOfDay,
    lunch_begin: TimeOfDay,
    lunch_end: TimeOfDay,
}

impl TryFrom<ScheduleRepr> for Schedule {
    type Error = ValidationError;

    fn try_from(repr: ScheduleRepr) -> Result<Self, Self::Error> {
        Self::new(
            repr.name,
            TimeInterval::new(repr.begin, repr.end),
            TimeInterval::new(repr.lunch_begin, repr.lunch_end),
        )
    }
}

impl From<Schedule> for ScheduleRepr {
    fn from(schedule: Schedule) -> Self {
        Self {
            name: schedule.name.into(),
            begin: schedule.working.begin,
            end: schedule.working.end,
            lunch_begin: schedule.lunch.begin,
            lunch_end: schedule.lunch.end,
        }
    }
}
