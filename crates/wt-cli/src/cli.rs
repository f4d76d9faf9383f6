//! Command-line argument definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use wt_core::TimeOfDay;

/// Work-time tracker.
///
/// Records daily check-in/check-out against named schedules, tracks leave
/// passes, and reports the accumulated time debt or overtime.
#[derive(Debug, Parser)]
#[command(name = "wt", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Manage working schedules.
    #[command(subcommand)]
    Schedule(ScheduleAction),

    /// Manage daily attendance records.
    #[command(subcommand)]
    Record(RecordAction),

    /// Set the arrival time, creating today's record if needed.
    CheckIn {
        /// Arrival time (HH:MM or HH:MM:SS). Defaults to now.
        #[arg(long)]
        time: Option<TimeOfDay>,

        /// Date of the record (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Last date of a range of existing records to update.
        #[arg(long)]
        to: Option<NaiveDate>,
    },

    /// Set the leaving time, creating today's record if needed.
    CheckOut {
        /// Leaving time (HH:MM or HH:MM:SS). Defaults to now.
        #[arg(long)]
        time: Option<TimeOfDay>,

        /// Date of the record (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Last date of a range of existing records to update.
        #[arg(long)]
        to: Option<NaiveDate>,
    },

    /// Manage leave passes.
    #[command(subcommand)]
    Leave(LeaveAction),

    /// Show time debt and overtime.
    ///
    /// Without a range or month, summarizes the current month.
    Summary {
        /// First date of the range (YYYY-MM-DD).
        #[arg(long, conflicts_with = "month")]
        from: Option<NaiveDate>,

        /// Last date of the range. Defaults to --from.
        #[arg(long, requires = "from")]
        to: Option<NaiveDate>,

        /// Calendar month (1-12).
        #[arg(long)]
        month: Option<u32>,

        /// Year of --month. Defaults to the current year.
        #[arg(long, requires = "month", allow_negative_numbers = true)]
        year: Option<i32>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}

/// Schedule subcommands.
#[derive(Debug, Subcommand)]
pub enum ScheduleAction {
    /// Add a new schedule. Schedules cannot be changed once added.
    Add {
        /// Unique schedule name.
        name: String,

        /// Start of working hours (HH:MM).
        #[arg(long)]
        begin: TimeOfDay,

        /// End of working hours (HH:MM).
        #[arg(long)]
        end: TimeOfDay,

        /// Start of the lunch break (HH:MM).
        #[arg(long)]
        lunch_begin: TimeOfDay,

        /// End of the lunch break (HH:MM).
        #[arg(long)]
        lunch_end: TimeOfDay,
    },

    /// List all schedules.
    List,

    /// Assign a schedule to existing records.
    Assign {
        /// Schedule name.
        name: String,

        /// First date of the range (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Last date of the range. Defaults to --from.
        #[arg(long)]
        to: Option<NaiveDate>,
    },
}

/// Attendance record subcommands.
#[derive(Debug, Subcommand)]
pub enum RecordAction {
    /// Create the record of a day.
    ///
    /// Unspecified times default to the schedule's hours; the schedule
    /// defaults to the one of the previous record.
    Add {
        /// Date of the record (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long)]
        check_in: Option<TimeOfDay>,

        #[arg(long)]
        check_out: Option<TimeOfDay>,

        /// Schedule name.
        #[arg(long)]
        schedule: Option<String>,
    },

    /// Show one day's record with its leave passes.
    Show {
        /// Date of the record (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// List records in a date range.
    List {
        /// First date of the range (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Last date of the range. Defaults to --from.
        #[arg(long)]
        to: Option<NaiveDate>,
    },
}

/// Leave pass subcommands.
#[derive(Debug, Subcommand)]
pub enum LeaveAction {
    /// Add a leave pass.
    Add {
        /// Start of the absence (HH:MM).
        #[arg(long)]
        from: TimeOfDay,

        /// End of the absence (HH:MM).
        #[arg(long)]
        to: TimeOfDay,

        /// Date of the leave pass (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long, default_value = "")]
        comment: String,
    },

    /// List the leave passes of a day.
    List {
        /// Date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Change an existing leave pass.
    Edit {
        /// Leave pass id within its date.
        id: u32,

        /// Date of the leave pass (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long)]
        from: Option<TimeOfDay>,

        #[arg(long)]
        to: Option<TimeOfDay>,

        #[arg(long)]
        comment: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn summary_month_conflicts_with_range() {
        let result = Cli::try_parse_from([
            "wt",
            "summary",
            "--from",
            "2022-01-01",
            "--month",
            "1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn parses_times_and_dates() {
        let cli = Cli::try_parse_from([
            "wt",
            "check-in",
            "--time",
            "09:15",
            "--date",
            "2022-01-18",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::CheckIn { time, date, to }) => {
                assert_eq!(time, Some(TimeOfDay::from_hm(9, 15)));
                assert_eq!(date, NaiveDate::from_ymd_opt(2022, 1, 18));
                assert_eq!(to, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_time() {
        let result = Cli::try_parse_from(["wt", "check-out", "--time", "25:00"]);
        assert!(result.is_err());
    }
}
