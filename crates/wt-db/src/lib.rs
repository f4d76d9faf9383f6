//! Storage layer for the work-time tracker.
//!
//! Persists schedules, attendance records and leave passes using `rusqlite`,
//! and implements [`RecordStore`] so the summary engine can read from it.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! This means a `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization (e.g. a `Mutex<Database>`).
//!
//! # Schema
//!
//! ## Date and Time Format
//!
//! Dates are stored as TEXT in ISO 8601 format (e.g., `2022-01-18`), so
//! lexicographic ordering matches chronological ordering and range queries can
//! use `BETWEEN`. Times of day are stored as TEXT `HH:MM:SS`, with a `.mmm`
//! suffix only when the time carries milliseconds.
//!
//! ## Schedules
//!
//! Records reference their schedule by name. Schedules are never updated in
//! place: a different working window is a different schedule. The configured
//! default schedule is inserted on open if no schedule of that name exists.

use std::path::Path;

use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row, params};
use thiserror::Error;
use wt_core::summary::normalize_range;
use wt_core::{
    AttendanceRecord, DayEntry, LeavePass, ParseTimeError, RecordStore, Schedule, ScheduleName,
    TimeInterval, TimeOfDay, ValidationError,
};

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A value violated a domain invariant.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// A stored date could not be parsed.
    #[error("invalid date in database: {value}")]
    DateParse {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored time of day could not be parsed.
    #[error("invalid time in database: {value}")]
    TimeParse {
        value: String,
        #[source]
        source: ParseTimeError,
    },
    #[error("schedule '{0}' already exists")]
    DuplicateSchedule(ScheduleName),
    #[error("unknown schedule '{0}'")]
    UnknownSchedule(ScheduleName),
    #[error("a record for {0} already exists")]
    DuplicateRecord(NaiveDate),
    /// A range-scoped update matched no records.
    #[error("no records between {from} and {to}")]
    NoRecordsInRange { from: NaiveDate, to: NaiveDate },
    #[error("no leave pass #{id} on {date}")]
    LeavePassNotFound { date: NaiveDate, id: u32 },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
    default_schedule: Schedule,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The schema is initialized and `default_schedule` installed on first
    /// open. If a schedule with the same name is already stored, the stored
    /// one wins.
    pub fn open(path: &Path, default_schedule: Schedule) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        Self::init(conn, default_schedule)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory(default_schedule: Schedule) -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn, default_schedule)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(conn: Connection, default_schedule: Schedule) -> Result<Self, DbError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(
            "
            -- Schedules are immutable once inserted
            CREATE TABLE IF NOT EXISTS schedules (
                name TEXT PRIMARY KEY,
                begin TEXT NOT NULL,
                end TEXT NOT NULL,
                lunch_begin TEXT NOT NULL,
                lunch_end TEXT NOT NULL
            );

            -- One record per calendar day
            -- date: ISO 8601 (e.g., '2022-01-18')
            -- check_in/check_out: 'HH:MM:SS[.mmm]'
            CREATE TABLE IF NOT EXISTS records (
                date TEXT PRIMARY KEY,
                schedule TEXT NOT NULL,
                check_in TEXT NOT NULL,
                check_out TEXT NOT NULL,
                FOREIGN KEY (schedule) REFERENCES schedules(name)
            );

            CREATE INDEX IF NOT EXISTS idx_records_schedule ON records(schedule);

            -- id is sequential per date, starting at 0
            CREATE TABLE IF NOT EXISTS leave_passes (
                date TEXT NOT NULL,
                id INTEGER NOT NULL,
                time_from TEXT NOT NULL,
                time_to TEXT NOT NULL,
                comment TEXT NOT NULL DEFAULT '',
                PRIMARY KEY (date, id)
            );
            ",
        )?;
        let default_schedule = install_default_schedule(&conn, default_schedule)?;
        Ok(Self {
            conn,
            default_schedule,
        })
    }

    /// Inserts a new schedule. Names are unique.
    pub fn insert_schedule(&mut self, schedule: &Schedule) -> Result<(), DbError> {
        if query_schedule(&self.conn, schedule.name())?.is_some() {
            return Err(DbError::DuplicateSchedule(schedule.name().clone()));
        }
        insert_schedule_row(&self.conn, schedule)?;
        tracing::debug!(%schedule, "inserted schedule");
        Ok(())
    }

    /// Lists all schedules ordered by name.
    pub fn schedules(&self) -> Result<Vec<Schedule>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT name, begin, end, lunch_begin, lunch_end
            FROM schedules
            ORDER BY name ASC
            ",
        )?;
        let rows = stmt.query_map([], ScheduleRow::from_row)?;
        let mut schedules = Vec::new();
        for row in rows {
            schedules.push(row?.parse()?);
        }
        Ok(schedules)
    }

    /// Creates the record for `date` with the schedule's own hours.
    ///
    /// The schedule is the one of the most recent earlier record, or the
    /// default schedule if there is none.
    pub fn insert_record(&mut self, date: NaiveDate) -> Result<AttendanceRecord, DbError> {
        let schedule = self.schedule_for_new_record(date)?;
        let record = AttendanceRecord::new(
            date,
            schedule.name().clone(),
            schedule.begin(),
            schedule.end(),
        )?;
        self.insert_new_record(record)
    }

    /// Creates the record for `date` with explicit check-in and check-out.
    ///
    /// Without an explicit schedule, the same fallback as [`Self::insert_record`]
    /// applies.
    pub fn insert_record_with(
        &mut self,
        date: NaiveDate,
        check_in: TimeOfDay,
        check_out: TimeOfDay,
        schedule: Option<&ScheduleName>,
    ) -> Result<AttendanceRecord, DbError> {
        let schedule = match schedule {
            Some(name) => query_schedule(&self.conn, name)?
                .ok_or_else(|| DbError::UnknownSchedule(name.clone()))?,
            None => self.schedule_for_new_record(date)?,
        };
        let record = AttendanceRecord::new(date, schedule.name().clone(), check_in, check_out)?;
        self.insert_new_record(record)
    }

    fn insert_new_record(&mut self, record: AttendanceRecord) -> Result<AttendanceRecord, DbError> {
        if query_record(&self.conn, record.date())?.is_some() {
            return Err(DbError::DuplicateRecord(record.date()));
        }
        self.conn.execute(
            "INSERT INTO records (date, schedule, check_in, check_out) VALUES (?1, ?2, ?3, ?4)",
            params![
                format_date(record.date()),
                record.schedule().as_str(),
                record.check_in().to_string(),
                record.check_out().to_string(),
            ],
        )?;
        tracing::debug!(%record, "inserted record");
        Ok(record)
    }

    /// Returns the record for `date`, if any.
    pub fn record(&self, date: NaiveDate) -> Result<Option<AttendanceRecord>, DbError> {
        query_record(&self.conn, date)
    }

    /// Assigns the schedule `name` to every record in the range.
    ///
    /// Returns the number of updated records.
    pub fn set_schedule(
        &mut self,
        name: &ScheduleName,
        from: NaiveDate,
        to: Option<NaiveDate>,
    ) -> Result<usize, DbError> {
        if query_schedule(&self.conn, name)?.is_none() {
            return Err(DbError::UnknownSchedule(name.clone()));
        }
        let (from, to) = normalize_range(from, to);
        let updated = self.conn.execute(
            "UPDATE records SET schedule = ?1 WHERE date BETWEEN ?2 AND ?3",
            params![name.as_str(), format_date(from), format_date(to)],
        )?;
        if updated == 0 {
            return Err(DbError::NoRecordsInRange { from, to });
        }
        tracing::debug!(schedule = %name, %from, %to, updated, "assigned schedule");
        Ok(updated)
    }

    /// Sets the check-in time of every record in the range.
    ///
    /// Nothing is written if any record would end up with check-in at or after
    /// its check-out.
    pub fn set_check_in(
        &mut self,
        check_in: TimeOfDay,
        from: NaiveDate,
        to: Option<NaiveDate>,
    ) -> Result<usize, DbError> {
        self.amend_records(from, to, |record| record.with_check_in(check_in))
    }

    /// Sets the check-out time of every record in the range.
    ///
    /// Nothing is written if any record would end up with check-out at or
    /// before its check-in.
    pub fn set_check_out(
        &mut self,
        check_out: TimeOfDay,
        from: NaiveDate,
        to: Option<NaiveDate>,
    ) -> Result<usize, DbError> {
        self.amend_records(from, to, |record| record.with_check_out(check_out))
    }

    fn amend_records<F>(
        &mut self,
        from: NaiveDate,
        to: Option<NaiveDate>,
        amend: F,
    ) -> Result<usize, DbError>
    where
        F: Fn(&AttendanceRecord) -> Result<AttendanceRecord, ValidationError>,
    {
        let (from, to) = normalize_range(from, to);
        let tx = self.conn.transaction()?;
        let records = query_records(&tx, from, to)?;
        if records.is_empty() {
            return Err(DbError::NoRecordsInRange { from, to });
        }
        {
            let mut stmt =
                tx.prepare("UPDATE records SET check_in = ?1, check_out = ?2 WHERE date = ?3")?;
            for record in &records {
                let amended = amend(record)?;
                stmt.execute(params![
                    amended.check_in().to_string(),
                    amended.check_out().to_string(),
                    format_date(amended.date()),
                ])?;
            }
        }
        tx.commit()?;
        tracing::debug!(%from, %to, updated = records.len(), "amended attendance");
        Ok(records.len())
    }

    /// Adds a leave pass to `date` with the next free id of that date.
    pub fn insert_leave_pass(
        &mut self,
        date: NaiveDate,
        from: TimeOfDay,
        to: TimeOfDay,
        comment: &str,
    ) -> Result<LeavePass, DbError> {
        let tx = self.conn.transaction()?;
        let id: u32 = tx.query_row(
            "SELECT COALESCE(MAX(id) + 1, 0) FROM leave_passes WHERE date = ?1",
            params![format_date(date)],
            |row| row.get(0),
        )?;
        let pass = LeavePass::new(date, id, from, to, comment)?;
        tx.execute(
            "
            INSERT INTO leave_passes (date, id, time_from, time_to, comment)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
            params![
                format_date(date),
                id,
                from.to_string(),
                to.to_string(),
                pass.comment(),
            ],
        )?;
        tx.commit()?;
        tracing::debug!(%pass, "inserted leave pass");
        Ok(pass)
    }

    /// Returns leave pass `id` of `date`, if any.
    pub fn leave_pass(&self, date: NaiveDate, id: u32) -> Result<Option<LeavePass>, DbError> {
        query_leave_pass(&self.conn, date, id)
    }

    pub fn set_leave_pass_from(
        &mut self,
        date: NaiveDate,
        id: u32,
        from: TimeOfDay,
    ) -> Result<LeavePass, DbError> {
        self.amend_leave_pass(date, id, |pass| pass.with_from(from))
    }

    pub fn set_leave_pass_to(
        &mut self,
        date: NaiveDate,
        id: u32,
        to: TimeOfDay,
    ) -> Result<LeavePass, DbError> {
        self.amend_leave_pass(date, id, |pass| pass.with_to(to))
    }

    pub fn set_leave_pass_comment(
        &mut self,
        date: NaiveDate,
        id: u32,
        comment: &str,
    ) -> Result<LeavePass, DbError> {
        self.amend_leave_pass(date, id, |pass| Ok(pass.with_comment(comment)))
    }

    /// Replaces any of the times and the comment of leave pass `id` in one write.
    ///
    /// The combined result is validated, so both times may move past the old
    /// interval at once.
    pub fn update_leave_pass(
        &mut self,
        date: NaiveDate,
        id: u32,
        from: Option<TimeOfDay>,
        to: Option<TimeOfDay>,
        comment: Option<&str>,
    ) -> Result<LeavePass, DbError> {
        self.amend_leave_pass(date, id, |pass| {
            LeavePass::new(
                date,
                id,
                from.unwrap_or(pass.from()),
                to.unwrap_or(pass.to()),
                comment.unwrap_or(pass.comment()),
            )
        })
    }

    fn amend_leave_pass<F>(&mut self, date: NaiveDate, id: u32, amend: F) -> Result<LeavePass, DbError>
    where
        F: FnOnce(&LeavePass) -> Result<LeavePass, ValidationError>,
    {
        let pass = query_leave_pass(&self.conn, date, id)?
            .ok_or(DbError::LeavePassNotFound { date, id })?;
        let amended = amend(&pass)?;
        self.conn.execute(
            "
            UPDATE leave_passes
            SET time_from = ?1, time_to = ?2, comment = ?3
            WHERE date = ?4 AND id = ?5
            ",
            params![
                amended.from().to_string(),
                amended.to().to_string(),
                amended.comment(),
                format_date(date),
                id,
            ],
        )?;
        tracing::debug!(pass = %amended, "amended leave pass");
        Ok(amended)
    }
}

impl RecordStore for Database {
    type Error = DbError;

    fn schedule(&self, name: &ScheduleName) -> Result<Option<Schedule>, DbError> {
        query_schedule(&self.conn, name)
    }

    fn schedule_before(&self, date: NaiveDate) -> Result<Option<Schedule>, DbError> {
        self.conn
            .query_row(
                "
                SELECT s.name, s.begin, s.end, s.lunch_begin, s.lunch_end
                FROM records r
                JOIN schedules s ON s.name = r.schedule
                WHERE r.date < ?1
                ORDER BY r.date DESC
                LIMIT 1
                ",
                params![format_date(date)],
                ScheduleRow::from_row,
            )
            .optional()?
            .map(ScheduleRow::parse)
            .transpose()
    }

    /// Records in the range; reversed bounds are swapped.
    fn records(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<AttendanceRecord>, DbError> {
        let (from, to) = normalize_range(from, Some(to));
        query_records(&self.conn, from, to)
    }

    fn leave_passes(&self, date: NaiveDate) -> Result<Vec<LeavePass>, DbError> {
        query_leave_passes(&self.conn, date)
    }

    fn default_schedule(&self) -> &Schedule {
        &self.default_schedule
    }

    /// Reads the whole range inside one transaction.
    fn day_entries(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<DayEntry>, DbError> {
        let tx = self.conn.unchecked_transaction()?;
        let mut entries = Vec::new();
        for record in query_records(&tx, from, to)? {
            let leave_passes = query_leave_passes(&tx, record.date())?;
            entries.push(DayEntry {
                record,
                leave_passes,
            });
        }
        tx.commit()?;
        Ok(entries)
    }
}

fn install_default_schedule(conn: &Connection, configured: Schedule) -> Result<Schedule, DbError> {
    match query_schedule(conn, configured.name())? {
        Some(stored) => {
            if stored != configured {
                tracing::warn!(
                    %stored,
                    %configured,
                    "stored default schedule differs from configuration, keeping stored one"
                );
            }
            Ok(stored)
        }
        None => {
            insert_schedule_row(conn, &configured)?;
            tracing::info!(schedule = %configured, "installed default schedule");
            Ok(configured)
        }
    }
}

fn insert_schedule_row(conn: &Connection, schedule: &Schedule) -> Result<(), DbError> {
    let lunch = schedule.lunch();
    conn.execute(
        "
        INSERT INTO schedules (name, begin, end, lunch_begin, lunch_end)
        VALUES (?1, ?2, ?3, ?4, ?5)
        ",
        params![
            schedule.name().as_str(),
            schedule.begin().to_string(),
            schedule.end().to_string(),
            lunch.begin.to_string(),
            lunch.end.to_string(),
        ],
    )?;
    Ok(())
}

fn query_schedule(conn: &Connection, name: &ScheduleName) -> Result<Option<Schedule>, DbError> {
    conn.query_row(
        "SELECT name, begin, end, lunch_begin, lunch_end FROM schedules WHERE name = ?1",
        params![name.as_str()],
        ScheduleRow::from_row,
    )
    .optional()?
    .map(ScheduleRow::parse)
    .transpose()
}

fn query_record(conn: &Connection, date: NaiveDate) -> Result<Option<AttendanceRecord>, DbError> {
    conn.query_row(
        "SELECT date, schedule, check_in, check_out FROM records WHERE date = ?1",
        params![format_date(date)],
        RecordRow::from_row,
    )
    .optional()?
    .map(RecordRow::parse)
    .transpose()
}

fn query_records(
    conn: &Connection,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<AttendanceRecord>, DbError> {
    let mut stmt = conn.prepare(
        "
        SELECT date, schedule, check_in, check_out
        FROM records
        WHERE date BETWEEN ?1 AND ?2
        ORDER BY date ASC
        ",
    )?;
    let rows = stmt.query_map(params![format_date(from), format_date(to)], RecordRow::from_row)?;
    let mut records = Vec::new();
    for row in rows {
        records.push(row?.parse()?);
    }
    Ok(records)
}

fn query_leave_pass(
    conn: &Connection,
    date: NaiveDate,
    id: u32,
) -> Result<Option<LeavePass>, DbError> {
    conn.query_row(
        "
        SELECT date, id, time_from, time_to, comment
        FROM leave_passes
        WHERE date = ?1 AND id = ?2
        ",
        params![format_date(date), id],
        LeavePassRow::from_row,
    )
    .optional()?
    .map(LeavePassRow::parse)
    .transpose()
}

fn query_leave_passes(conn: &Connection, date: NaiveDate) -> Result<Vec<LeavePass>, DbError> {
    let mut stmt = conn.prepare(
        "
        SELECT date, id, time_from, time_to, comment
        FROM leave_passes
        WHERE date = ?1
        ORDER BY id ASC
        ",
    )?;
    let rows = stmt.query_map(params![format_date(date)], LeavePassRow::from_row)?;
    let mut passes = Vec::new();
    for row in rows {
        passes.push(row?.parse()?);
    }
    Ok(passes)
}

/// Raw `schedules` row, validated by [`ScheduleRow::parse`].
struct ScheduleRow {
    name: String,
    begin: String,
    end: String,
    lunch_begin: String,
    lunch_end: String,
}

impl ScheduleRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            name: row.get(0)?,
            begin: row.get(1)?,
            end: row.get(2)?,
            lunch_begin: row.get(3)?,
            lunch_end: row.get(4)?,
        })
    }

    fn parse(self) -> Result<Schedule, DbError> {
        let working = TimeInterval::new(parse_time(&self.begin)?, parse_time(&self.end)?);
        let lunch = TimeInterval::new(parse_time(&self.lunch_begin)?, parse_time(&self.lunch_end)?);
        Ok(Schedule::new(self.name, working, lunch)?)
    }
}

struct RecordRow {
    date: String,
    schedule: String,
    check_in: String,
    check_out: String,
}

impl RecordRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            date: row.get(0)?,
            schedule: row.get(1)?,
            check_in: row.get(2)?,
            check_out: row.get(3)?,
        })
    }

    fn parse(self) -> Result<AttendanceRecord, DbError> {
        Ok(AttendanceRecord::new(
            parse_date(&self.date)?,
            ScheduleName::new(self.schedule)?,
            parse_time(&self.check_in)?,
            parse_time(&self.check_out)?,
        )?)
    }
}

struct LeavePassRow {
    date: String,
    id: u32,
    from: String,
    to: String,
    comment: String,
}

impl LeavePassRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            date: row.get(0)?,
            id: row.get(1)?,
            from: row.get(2)?,
            to: row.get(3)?,
            comment: row.get(4)?,
        })
    }

    fn parse(self) -> Result<LeavePass, DbError> {
        Ok(LeavePass::new(
            parse_date(&self.date)?,
            self.id,
            parse_time(&self.from)?,
            parse_time(&self.to)?,
            self.comment,
        )?)
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn parse_date(value: &str) -> Result<NaiveDate, DbError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|source| DbError::DateParse {
        value: value.to_string(),
        source,
    })
}

fn parse_time(value: &str) -> Result<TimeOfDay, DbError> {
    value.parse().map_err(|source| DbError::TimeParse {
        value: value.to_string(),
        source,
    })
}
