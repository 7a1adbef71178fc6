//! Storage layer for the time tracker.
//!
//! Provides persistence for activities, aliases and activity logs using
//! `rusqlite`, and implements [`ActivityStore`] on top of it.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization.
//!
//! # Schema
//!
//! ## Timestamp Format
//!
//! Timestamps are local wall-clock times stored as TEXT (`2024-01-15T10:30:00`),
//! days as `2024-01-15`. Lexicographic ordering matches chronological ordering,
//! so range filters run directly on the text columns.
//!
//! ## History
//!
//! Logs reference activities by their `AUTOINCREMENT` id, which is never
//! reused. Renaming an activity keeps its history attached. Deleting an
//! activity leaves its logs behind; reports skip them.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;
use tracing::{debug, warn};
use tt_core::period::DATE_FORMAT;
use tt_core::tracking::{self, ActivityLog, Running};
use tt_core::{
    Activity, ActivityId, ActivityStore, ActivityUpdate, AliasError, AliasIndex, Clock,
    LogEntry, Period, SystemClock, TrackingError, ValidationError,
};

/// Format of stored timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("activity '{name}' not found")]
    NotFound { name: String },
    #[error("activity '{name}' already exists")]
    ActivityExists { name: String },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Alias(#[from] AliasError),
    #[error(transparent)]
    Tracking(#[from] TrackingError),
    /// A stored day or timestamp could not be parsed.
    #[error("invalid stored timestamp: {value}")]
    TimestampParse {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

impl DbError {
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Database connection wrapper.
///
/// Keeps the alias index in memory; every write that touches an alias
/// updates the index first and restores it when the write fails.
pub struct Database {
    conn: Connection,
    clock: Box<dyn Clock>,
    aliases: AliasIndex,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        Self::from_connection(Connection::open(path)?)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    /// Replaces the clock used for every "now" read.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    fn from_connection(conn: Connection) -> Result<Self, DbError> {
        let mut db = Self {
            conn,
            clock: Box::new(SystemClock),
            aliases: AliasIndex::new(),
        };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema and loads the alias index.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&mut self) -> Result<(), DbError> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS activities (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                description TEXT
            );

            CREATE TABLE IF NOT EXISTS aliases (
                alias TEXT PRIMARY KEY,
                activity_id INTEGER NOT NULL UNIQUE,
                FOREIGN KEY (activity_id) REFERENCES activities(id) ON DELETE CASCADE
            );

            -- day: YYYY-MM-DD bucket the log is filed under
            -- stopped_at: NULL while the timer runs
            CREATE TABLE IF NOT EXISTS activity_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                activity_id INTEGER NOT NULL,
                day TEXT NOT NULL,
                started_at TEXT NOT NULL,
                stopped_at TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_activity_logs_day ON activity_logs(day);
            CREATE INDEX IF NOT EXISTS idx_activity_logs_activity ON activity_logs(activity_id);
            CREATE UNIQUE INDEX IF NOT EXISTS idx_activity_logs_open
                ON activity_logs((stopped_at IS NULL)) WHERE stopped_at IS NULL;
            ",
        )?;
        self.load_aliases()
    }

    fn load_aliases(&mut self) -> Result<(), DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT al.alias, a.name
            FROM aliases al
            JOIN activities a ON a.id = al.activity_id
            ",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        drop(stmt);
        self.aliases.load(entries);
        debug!(aliases = self.aliases.len(), "Loaded alias index");
        Ok(())
    }

    /// The clock every "now" read goes through.
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// The in-memory alias index.
    pub const fn aliases(&self) -> &AliasIndex {
        &self.aliases
    }

    /// Deletes logs filed under any day from the period's start date through
    /// its end date, optionally only those of one activity. Returns the
    /// number of deleted logs.
    pub fn wipe_logs(
        &mut self,
        period: &Period,
        activity: Option<&Activity>,
    ) -> Result<usize, DbError> {
        let [first, last] = day_bounds(period);
        let activity_id = activity.and_then(|a| a.id).map(ActivityId::get);
        let tx = self.conn.transaction()?;
        let deleted = tx.execute(
            "
            DELETE FROM activity_logs
            WHERE day >= ?1 AND day <= ?2 AND (?3 IS NULL OR activity_id = ?3)
            ",
            params![first, last, activity_id],
        )?;
        tx.commit()?;
        debug!(deleted, %first, %last, ?activity_id, "Wiped activity logs");
        Ok(deleted)
    }

    /// Deletes every activity, alias and log.
    pub fn purge(&mut self) -> Result<(), DbError> {
        let tx = self.conn.transaction()?;
        tx.execute_batch(
            "
            DELETE FROM activity_logs;
            DELETE FROM aliases;
            DELETE FROM activities;
            ",
        )?;
        tx.commit()?;
        self.aliases = AliasIndex::new();
        debug!("Purged all activities and logs");
        Ok(())
    }

    fn activity_by_name(&self, name: &str) -> Result<Option<Activity>, DbError> {
        let activity = self
            .conn
            .query_row(
                &format!("{SELECT_ACTIVITY} WHERE a.name = ?"),
                [name],
                activity_from_row,
            )
            .optional()?;
        Ok(activity)
    }

    fn insert_activity(&mut self, activity: &Activity) -> Result<ActivityId, DbError> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO activities (name, description) VALUES (?, ?)",
            params![activity.name, activity.description],
        )?;
        let id = tx.last_insert_rowid();
        if let Some(alias) = &activity.alias {
            tx.execute(
                "INSERT INTO aliases (alias, activity_id) VALUES (?, ?)",
                params![alias, id],
            )?;
        }
        tx.commit()?;
        Ok(ActivityId::new(id))
    }

    fn delete_activity(&mut self, id: ActivityId) -> Result<usize, DbError> {
        let now = format_timestamp(self.clock.now());
        let tx = self.conn.transaction()?;
        let closed = tx.execute(
            "
            UPDATE activity_logs
            SET stopped_at = MAX(started_at, ?1)
            WHERE activity_id = ?2 AND stopped_at IS NULL
            ",
            params![now, id.get()],
        )?;
        tx.execute("DELETE FROM activities WHERE id = ?", [id.get()])?;
        tx.commit()?;
        Ok(closed)
    }

    fn rebind_alias(&mut self, alias: &str, name: &str) -> Result<(), DbError> {
        self.aliases.delete(alias);
        self.aliases.update(alias, name)?;
        Ok(())
    }
}

impl ActivityStore for Database {
    type Error = DbError;

    fn find(&self, name_or_alias: &str) -> Result<Activity, DbError> {
        let key = name_or_alias.trim().to_lowercase();
        if let Some(activity) = self.activity_by_name(&key)? {
            return Ok(activity);
        }
        if let Ok(name) = self.aliases.get(&key) {
            if let Some(activity) = self.activity_by_name(name)? {
                return Ok(activity);
            }
        }
        Err(DbError::NotFound {
            name: name_or_alias.to_string(),
        })
    }

    fn activity_by_id(&self, id: ActivityId) -> Result<Option<Activity>, DbError> {
        load_activity(&self.conn, id)
    }

    fn add(&mut self, mut activity: Activity) -> Result<Activity, DbError> {
        activity.validate_name()?;
        activity.alias = activity.alias.take().map(|alias| alias.to_lowercase());
        if self.activity_by_name(&activity.name)?.is_some() {
            return Err(DbError::ActivityExists {
                name: activity.name,
            });
        }

        if let Some(alias) = &activity.alias {
            self.aliases.update(alias, &activity.name)?;
        }
        let inserted = self.insert_activity(&activity);
        if inserted.is_err() {
            if let Some(alias) = &activity.alias {
                self.aliases.delete(alias);
            }
        }
        let id = inserted?;

        debug!(%id, name = %activity.name, alias = ?activity.alias, "Added activity");
        Ok(activity.with_id(id))
    }

    fn update(
        &mut self,
        name_or_alias: &str,
        update: &ActivityUpdate,
    ) -> Result<Activity, DbError> {
        let current = self.find(name_or_alias)?;
        let Some(id) = current.id else {
            return Err(DbError::NotFound {
                name: name_or_alias.to_string(),
            });
        };
        if update.is_noop() {
            return Ok(current);
        }

        let mut updated = update.apply(current.clone());
        updated.validate_name()?;
        let renamed = updated.name != current.name;
        if renamed && self.activity_by_name(&updated.name)?.is_some() {
            return Err(DbError::ActivityExists { name: updated.name });
        }

        let moved_alias = current.alias.as_deref().filter(|_| renamed);
        if let Some(alias) = moved_alias {
            self.rebind_alias(alias, &updated.name)?;
        }
        let written = self.conn.execute(
            "UPDATE activities SET name = ?, description = ? WHERE id = ?",
            params![updated.name, updated.description, id.get()],
        );
        if let Err(err) = written {
            if let Some(alias) = moved_alias {
                self.rebind_alias(alias, &current.name)?;
            }
            return Err(err.into());
        }

        debug!(%id, from = %current.name, to = %updated.name, "Updated activity");
        Ok(updated)
    }

    fn delete(&mut self, name_or_alias: &str) -> Result<(), DbError> {
        let activity = self.find(name_or_alias)?;
        let Some(id) = activity.id else {
            return Err(DbError::NotFound {
                name: name_or_alias.to_string(),
            });
        };

        if let Some(alias) = &activity.alias {
            self.aliases.delete(alias);
        }
        let deleted = self.delete_activity(id);
        if deleted.is_err() {
            if let Some(alias) = &activity.alias {
                self.aliases.update(alias, &activity.name)?;
            }
        }
        let closed = deleted?;

        debug!(%id, name = %activity.name, closed, "Deleted activity");
        Ok(())
    }

    fn list(&self) -> Result<Vec<Activity>, DbError> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SELECT_ACTIVITY} ORDER BY a.name ASC"))?;
        let rows = stmt.query_map([], activity_from_row)?;
        let mut activities = Vec::new();
        for row in rows {
            activities.push(row?);
        }
        Ok(activities)
    }

    fn start(&mut self, activity: &Activity) -> Result<(), DbError> {
        let now = self.clock.now();
        let tx = self.conn.transaction()?;
        let running = load_running(&tx)?;
        let log = tracking::plan_start(activity, running.as_ref(), now)?;
        tx.execute(
            "INSERT INTO activity_logs (activity_id, day, started_at) VALUES (?, ?, ?)",
            params![
                log.activity_id.get(),
                format_day(log.day),
                format_timestamp(log.started_at)
            ],
        )?;
        tx.commit()?;
        debug!(name = %activity.name, started_at = %log.started_at, "Started activity");
        Ok(())
    }

    fn stop(&mut self, activity: &Activity) -> Result<(), DbError> {
        let now = self.clock.now();
        let tx = self.conn.transaction()?;
        let running = load_running(&tx)?;
        let today = load_logs_for_day(&tx, now.date())?;
        let closed = tracking::plan_stop(activity, running.as_ref(), &today, now)?;
        tx.execute(
            "UPDATE activity_logs SET stopped_at = ? WHERE id = ?",
            params![format_timestamp(closed.stopped_at), closed.log_id],
        )?;
        tx.commit()?;
        debug!(
            name = %activity.name,
            duration_seconds = closed.duration_seconds,
            "Stopped activity"
        );
        Ok(())
    }

    fn logs_for_period(
        &self,
        period: &Period,
    ) -> Result<BTreeMap<NaiveDate, Vec<LogEntry>>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "
            {SELECT_LOG}
            WHERE stopped_at IS NOT NULL AND day >= ? AND day <= ?
            ORDER BY day ASC, started_at ASC, id ASC
            "
        ))?;
        let rows = stmt.query_map(day_bounds(period), LogRow::from_row)?;
        let mut logs: BTreeMap<NaiveDate, Vec<LogEntry>> = BTreeMap::new();
        for row in rows {
            let log = row?.into_log()?;
            let Some(duration_seconds) = log.duration_seconds() else {
                continue;
            };
            logs.entry(log.day).or_default().push(LogEntry {
                activity_id: log.activity_id,
                duration_seconds,
            });
        }
        Ok(logs)
    }

    fn currently_tracked_activity(&self) -> Result<Option<Activity>, DbError> {
        Ok(load_running(&self.conn)?.map(|running| running.activity))
    }
}

const SELECT_ACTIVITY: &str = "
    SELECT a.id, a.name, al.alias, a.description
    FROM activities a
    LEFT JOIN aliases al ON al.activity_id = a.id
";

const SELECT_LOG: &str = "
    SELECT id, activity_id, day, started_at, stopped_at
    FROM activity_logs
";

fn activity_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Activity> {
    Ok(Activity {
        id: Some(ActivityId::new(row.get(0)?)),
        name: row.get(1)?,
        alias: row.get(2)?,
        description: row.get(3)?,
    })
}

fn load_activity(conn: &Connection, id: ActivityId) -> Result<Option<Activity>, DbError> {
    let activity = conn
        .query_row(
            &format!("{SELECT_ACTIVITY} WHERE a.id = ?"),
            [id.get()],
            activity_from_row,
        )
        .optional()?;
    Ok(activity)
}

/// The open log and its activity, if any.
fn load_running(conn: &Connection) -> Result<Option<Running>, DbError> {
    let row = conn
        .query_row(
            &format!("{SELECT_LOG} WHERE stopped_at IS NULL ORDER BY started_at DESC LIMIT 1"),
            [],
            LogRow::from_row,
        )
        .optional()?;
    let Some(log) = row.map(LogRow::into_log).transpose()? else {
        return Ok(None);
    };
    let Some(activity) = load_activity(conn, log.activity_id)? else {
        warn!(log_id = log.id, activity_id = %log.activity_id, "Open log without activity");
        return Ok(None);
    };
    Ok(Some(Running { activity, log }))
}

fn load_logs_for_day(conn: &Connection, day: NaiveDate) -> Result<Vec<ActivityLog>, DbError> {
    let mut stmt = conn.prepare(&format!(
        "{SELECT_LOG} WHERE day = ? ORDER BY started_at ASC, id ASC"
    ))?;
    let rows = stmt.query_map([format_day(day)], LogRow::from_row)?;
    let mut logs = Vec::new();
    for row in rows {
        logs.push(row?.into_log()?);
    }
    Ok(logs)
}

/// A log row as stored, before its text columns are parsed.
#[derive(Debug)]
struct LogRow {
    id: i64,
    activity_id: i64,
    day: String,
    started_at: String,
    stopped_at: Option<String>,
}

impl LogRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            activity_id: row.get(1)?,
            day: row.get(2)?,
            started_at: row.get(3)?,
            stopped_at: row.get(4)?,
        })
    }

    fn into_log(self) -> Result<ActivityLog, DbError> {
        Ok(ActivityLog {
            id: self.id,
            activity_id: ActivityId::new(self.activity_id),
            day: parse_day(&self.day)?,
            started_at: parse_timestamp(&self.started_at)?,
            stopped_at: self.stopped_at.as_deref().map(parse_timestamp).transpose()?,
        })
    }
}

/// Start and end date of the period as stored day strings, both inclusive.
fn day_bounds(period: &Period) -> [String; 2] {
    [format_day(period.start_date()), format_day(period.end_date())]
}

fn format_day(day: NaiveDate) -> String {
    day.format(DATE_FORMAT).to_string()
}

fn parse_day(value: &str) -> Result<NaiveDate, DbError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|source| DbError::TimestampParse {
        value: value.to_string(),
        source,
    })
}

fn format_timestamp(timestamp: NaiveDateTime) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

fn parse_timestamp(value: &str) -> Result<NaiveDateTime, DbError> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).map_err(|source| {
        DbError::TimestampParse {
            value: value.to_string(),
            source,
        }
    })
}
