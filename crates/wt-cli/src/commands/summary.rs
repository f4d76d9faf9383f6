//! Summary command for showing time debt and overtime.
//!
//! This module implements `wt summary`, which balances every record in a
//! date range (or calendar month) against its schedule.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use wt_core::{SummaryEngine, SummaryReport};
use wt_db::Database;

/// Period to summarize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    /// `[from, to]`; a missing `to` means the single day `from`.
    Range {
        from: NaiveDate,
        to: Option<NaiveDate>,
    },
    /// A calendar month; a missing or negative year means the current one.
    Month { month: u32, year: Option<i32> },
}

impl Period {
    /// The period selected by the `summary` flags; defaults to the month of `today`.
    pub fn from_args(
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        month: Option<u32>,
        year: Option<i32>,
        today: NaiveDate,
    ) -> Self {
        match (from, month) {
            (Some(from), _) => Self::Range { from, to },
            (None, Some(month)) => Self::Month { month, year },
            (None, None) => Self::Month {
                month: today.month(),
                year: Some(today.year()),
            },
        }
    }
}

/// Computes the per-day report for `period`.
pub fn build_report(db: &Database, period: Period, today: NaiveDate) -> Result<SummaryReport> {
    let engine = SummaryEngine::new(db);
    let report = match period {
        Period::Range { from, to } => engine.report(from, to),
        Period::Month { month, year } => engine.month_report(month, year, today),
    }
    .context("failed to compute summary")?;
    Ok(report)
}

/// Writes the report as a table followed by the signed total.
pub fn write_report<W: Write>(writer: &mut W, report: &SummaryReport) -> Result<()> {
    writeln!(writer, "Summary {} - {}", report.from, report.to)?;
    writeln!(writer)?;

    if report.days.is_empty() {
        writeln!(writer, "No records in this period.")?;
    } else {
        writeln!(
            writer,
            "{:<10}  {:<12}  {:>4}  {:>8}  {:>7}",
            "Date", "Schedule", "Debt", "Overtime", "Balance"
        )?;
        writeln!(writer, "──────────  ────────────  ────  ────────  ───────")?;
        for day in &report.days {
            writeln!(
                writer,
                "{:<10}  {:<12}  {:>4}  {:>8}  {:>7}",
                day.date.to_string(),
                day.schedule.as_str(),
                day.debt.to_string(),
                day.overtime.to_string(),
                day.balance.to_string()
            )?;
        }
    }

    writeln!(writer)?;
    writeln!(writer, "Total: {}", report.total)?;
    Ok(())
}

/// Runs the summary command.
pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    period: Period,
    today: NaiveDate,
    json: bool,
) -> Result<()> {
    let report = build_report(db, period, today)?;
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&report)?)?;
    } else {
        write_report(writer, &report)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use wt_core::{Schedule, TimeOfDay};

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 1, day).unwrap()
    }

    fn hm(hour: u32, minute: u32) -> TimeOfDay {
        TimeOfDay::from_hm(hour, minute)
    }

    fn seeded() -> Database {
        let mut db = Database::open_in_memory(Schedule::default()).unwrap();
        db.insert_record_with(date(18), hm(9, 0), hm(17, 0), None)
            .unwrap();
        db.insert_record_with(date(19), hm(8, 0), hm(17, 30), None)
            .unwrap();
        db.insert_leave_pass(date(19), hm(17, 5), hm(17, 20), "")
            .unwrap();
        db
    }

    #[test]
    fn period_defaults_to_current_month() {
        let today = date(18);
        assert_eq!(
            Period::from_args(None, None, None, None, today),
            Period::Month {
                month: 1,
                year: Some(2022)
            }
        );
        assert_eq!(
            Period::from_args(Some(date(3)), None, None, None, today),
            Period::Range {
                from: date(3),
                to: None
            }
        );
    }

    #[test]
    fn summary_table_for_range() {
        let db = seeded();
        let mut output = Vec::new();
        let period = Period::Range {
            from: date(19),
            to: Some(date(18)),
        };
        run(&mut output, &db, period, date(20), false).unwrap();

        assert_snapshot!(String::from_utf8(output).unwrap(), @r"
        Summary 2022-01-18 - 2022-01-19

        Date        Schedule      Debt  Overtime  Balance
        ──────────  ────────────  ────  ────────  ───────
        2022-01-18  default       1:00      0:00    -1:00
        2022-01-19  default       0:15      0:30     0:15

        Total: -0:45
        ");
    }

    #[test]
    fn summary_for_empty_month() {
        let db = seeded();
        let mut output = Vec::new();
        let period = Period::Month {
            month: 2,
            year: None,
        };
        run(&mut output, &db, period, date(20), false).unwrap();

        assert_snapshot!(String::from_utf8(output).unwrap(), @r"
        Summary 2022-02-01 - 2022-02-28

        No records in this period.

        Total: 0:00
        ");
    }

    #[test]
    fn summary_json() {
        let db = seeded();
        let mut output = Vec::new();
        let period = Period::Range {
            from: date(18),
            to: None,
        };
        run(&mut output, &db, period, date(20), true).unwrap();

        assert_snapshot!(String::from_utf8(output).unwrap(), @r#"
        {
          "from": "2022-01-18",
          "to": "2022-01-18",
          "days": [
            {
              "date": "2022-01-18",
              "schedule": "default",
              "debt": 3600,
              "overtime": 0,
              "balance": -3600
            }
          ],
          "total": -3600
        }
        "#);
    }

    #[test]
    fn summary_rejects_invalid_month() {
        let db = seeded();
        let mut output = Vec::new();
        let period = Period::Month {
            month: 13,
            year: Some(2022),
        };
        let err = run(&mut output, &db, period, date(20), false).unwrap_err();
        assert!(format!("{err:#}").contains("month must be between 1 and 12"));
    }
}
