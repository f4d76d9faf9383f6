//! Core domain logic for the work-time tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Time primitives: time of day, intervals and signed spans
//! - Interval algebra: union and minute-quantized subtraction
//! - Schedules, attendance records and leave passes
//! - Summary: debt/overtime balance over a date range or calendar month

pub mod interval;
pub mod record;
pub mod store;
pub mod summary;
pub mod time;
pub mod types;

pub use interval::{
    DEFAULT_QUANTUM_MS, IntervalConfig, subtract, subtract_all, subtract_all_with, subtract_with,
    total_span, unite, unite_all,
};
pub use record::{AttendanceRecord, LeavePass};
pub use store::{DayEntry, RecordStore};
pub use summary::{DaySummary, SummaryEngine, SummaryError, SummaryReport};
pub use time::{ParseTimeError, TimeInterval, TimeOfDay, TimeSpan};
pub use types::{DEFAULT_SCHEDULE_NAME, Schedule, ScheduleName, ValidationError};
