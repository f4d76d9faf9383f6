//! Debt/overtime summary over a range of attendance records.
//!
//! # Algorithm Summary
//!
//! For every record in the range:
//!
//! 1. Resolve its schedule by name. An unknown name aborts the whole query.
//! 2. Late arrival and early departure go into a debt set; early arrival and
//!    late departure go into an overtime set.
//! 3. Every leave pass of the day is added to the debt set.
//! 4. Both sets are merged with [`unite_all`] so overlaps count once.
//! 5. The day balances to `overtime - debt`; the range sums the days.
//!
//! The schedule's lunch window does not take part in the computation.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use chrono::{Datelike, Local, Months, NaiveDate};
use serde::Serialize;
use thiserror::Error;

use crate::interval::{total_span, unite_all};
use crate::record::{AttendanceRecord, LeavePass};
use crate::store::{DayEntry, RecordStore};
use crate::time::{TimeInterval, TimeSpan};
use crate::types::{Schedule, ScheduleName};

/// Errors that abort a summary.
#[derive(Debug, Error)]
pub enum SummaryError<E> {
    /// A record in range references a schedule the store does not know.
    #[error("record for {date} references unknown schedule '{name}'")]
    UnknownSchedule { date: NaiveDate, name: ScheduleName },

    /// The requested month is not in 1..=12.
    #[error("month must be between 1 and 12, got {0}")]
    InvalidMonth(u32),

    /// The requested year has no calendar representation.
    #[error("year {0} is out of range")]
    InvalidYear(i32),

    /// The record store failed.
    #[error("record store error: {0}")]
    Store(#[source] E),
}

/// Debt and overtime of a single day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub schedule: ScheduleName,
    pub debt: TimeSpan,
    pub overtime: TimeSpan,
    pub balance: TimeSpan,
}

/// Per-day breakdown of a range plus its total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryReport {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub days: Vec<DaySummary>,
    pub total: TimeSpan,
}

/// Orders a possibly open-ended range: a missing end means a single day.
pub fn normalize_range(from: NaiveDate, to: Option<NaiveDate>) -> (NaiveDate, NaiveDate) {
    let to = to.unwrap_or(from);
    if from > to { (to, from) } else { (from, to) }
}

/// First and last day of `month` in `year`.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let last = first.checked_add_months(Months::new(1))?.pred_opt()?;
    Some((first, last))
}

/// Balances one day against its schedule.
pub fn assess_day(
    schedule: &Schedule,
    record: &AttendanceRecord,
    leave_passes: &[LeavePass],
) -> DaySummary {
    let begin = schedule.begin();
    let end = schedule.end();

    let mut debt = Vec::with_capacity(leave_passes.len() + 2);
    let mut overtime = Vec::with_capacity(2);

    if record.check_in() > begin {
        debt.push(TimeInterval::new(begin, record.check_in()));
    } else {
        overtime.push(TimeInterval::new(record.check_in(), begin));
    }

    if record.check_out() < end {
        debt.push(TimeInterval::new(record.check_out(), end));
    } else {
        overtime.push(TimeInterval::new(end, record.check_out()));
    }

    debt.extend(leave_passes.iter().map(LeavePass::interval));

    let debt = total_span(&unite_all(&debt));
    let overtime = total_span(&unite_all(&overtime));

    DaySummary {
        date: record.date(),
        schedule: schedule.name().clone(),
        debt,
        overtime,
        balance: overtime - debt,
    }
}

/// Computes time balances from a [`RecordStore`].
///
/// Holds no state between calls; each call reads its own snapshot.
#[derive(Debug)]
pub struct SummaryEngine<'a, S> {
    store: &'a S,
}

impl<'a, S: RecordStore> SummaryEngine<'a, S> {
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Net balance (overtime minus debt) for `[from, to]`.
    ///
    /// A missing `to` means the single day `from`; reversed bounds are swapped.
    pub fn summary(
        &self,
        from: NaiveDate,
        to: Option<NaiveDate>,
    ) -> Result<TimeSpan, SummaryError<S::Error>> {
        self.report(from, to).map(|report| report.total)
    }

    /// Net balance for a calendar month.
    ///
    /// A missing or negative `year` means the current year.
    pub fn month_summary(
        &self,
        month: u32,
        year: Option<i32>,
    ) -> Result<TimeSpan, SummaryError<S::Error>> {
        self.month_report(month, year, Local::now().date_naive())
            .map(|report| report.total)
    }

    /// Per-day breakdown for a calendar month, resolving the year against `today`.
    pub fn month_report(
        &self,
        month: u32,
        year: Option<i32>,
        today: NaiveDate,
    ) -> Result<SummaryReport, SummaryError<S::Error>> {
        let year = year.filter(|year| *year >= 0).unwrap_or_else(|| today.year());
        if !(1..=12).contains(&month) {
            return Err(SummaryError::InvalidMonth(month));
        }
        let (first, last) = month_bounds(year, month).ok_or(SummaryError::InvalidYear(year))?;
        self.report(first, Some(last))
    }

    /// Per-day breakdown for `[from, to]`.
    ///
    /// Fails as a whole if any record's schedule cannot be resolved.
    pub fn report(
        &self,
        from: NaiveDate,
        to: Option<NaiveDate>,
    ) -> Result<SummaryReport, SummaryError<S::Error>> {
        let (from, to) = normalize_range(from, to);
        let entries = self
            .store
            .day_entries(from, to)
            .map_err(SummaryError::Store)?;

        let mut schedules: HashMap<ScheduleName, Schedule> = HashMap::new();
        let mut days = Vec::with_capacity(entries.len());
        let mut total = TimeSpan::ZERO;

        for DayEntry {
            record,
            leave_passes,
        } in entries
        {
            let schedule = match schedules.entry(record.schedule().clone()) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => {
                    let Some(schedule) = self
                        .store
                        .schedule(entry.key())
                        .map_err(SummaryError::Store)?
                    else {
                        tracing::warn!(date = %record.date(), schedule = %entry.key(), "unknown schedule, aborting summary");
                        return Err(SummaryError::UnknownSchedule {
                            date: record.date(),
                            name: entry.into_key(),
                        });
                    };
                    entry.insert(schedule)
                }
            };

            let day = assess_day(schedule, &record, &leave_passes);
            tracing::debug!(
                date = %day.date,
                debt_s = day.debt.seconds(),
                overtime_s = day.overtime.seconds(),
                "assessed day"
            );
            total += day.balance;
            days.push(day);
        }

        tracing::debug!(%from, %to, days = days.len(), total_s = total.seconds(), "computed summary");
        Ok(SummaryReport {
            from,
            to,
            days,
            total,
        })
    }
}
