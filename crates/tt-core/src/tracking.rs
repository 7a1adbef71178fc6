//! Start/stop rules for activity timers.
//!
//! At most one timer runs at any time across all activities. The functions
//! here only decide; the store applies the outcome in a single write.

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

use crate::activity::{Activity, ActivityId};

/// Tracking conflicts. The messages are shown to the user as-is.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TrackingError {
    #[error(
        "you are already tracking activity {activity}, please stop that one before starting a new one"
    )]
    AlreadyTracking { activity: String },

    #[error("activity {activity} is already being tracked")]
    AlreadyRunning { activity: String },

    #[error("no activity started yet today")]
    NothingTrackedToday,

    #[error("you are currently tracking activity {activity}, stop that one instead")]
    AlreadyTrackingOther { activity: String },

    #[error("activity {activity} has not been started today")]
    ActivityNotStarted { activity: String },

    #[error("activity {activity} has already been stopped, please start a new one")]
    AlreadyStopped { activity: String },

    #[error("activity {activity} cannot stop at {stopped_at} before it started at {started_at}")]
    NegativeDuration {
        activity: String,
        started_at: NaiveDateTime,
        stopped_at: NaiveDateTime,
    },

    #[error("activity {activity} has not been saved yet")]
    Unsaved { activity: String },
}

/// One timer run for an activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityLog {
    pub id: i64,
    pub activity_id: ActivityId,
    /// Day bucket the log is filed under.
    pub day: NaiveDate,
    pub started_at: NaiveDateTime,
    pub stopped_at: Option<NaiveDateTime>,
}

impl ActivityLog {
    pub const fn is_open(&self) -> bool {
        self.stopped_at.is_none()
    }

    /// Whole seconds between start and stop, `None` while running.
    pub fn duration_seconds(&self) -> Option<i64> {
        self.stopped_at
            .map(|stopped_at| (stopped_at - self.started_at).num_seconds())
    }
}

/// The currently tracked activity and its open log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Running {
    pub activity: Activity,
    pub log: ActivityLog,
}

/// A log to insert when a timer starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLog {
    pub activity_id: ActivityId,
    pub day: NaiveDate,
    pub started_at: NaiveDateTime,
}

/// A log to close when a timer stops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosedLog {
    pub log_id: i64,
    pub stopped_at: NaiveDateTime,
    pub duration_seconds: i64,
}

/// Decides whether `activity` may start at `now`.
pub fn plan_start(
    activity: &Activity,
    running: Option<&Running>,
    now: NaiveDateTime,
) -> Result<NewLog, TrackingError> {
    let activity_id = saved_id(activity)?;
    if let Some(running) = running {
        if running.log.activity_id == activity_id {
            return Err(TrackingError::AlreadyRunning {
                activity: activity.name.clone(),
            });
        }
        return Err(TrackingError::AlreadyTracking {
            activity: running.activity.name.clone(),
        });
    }
    Ok(NewLog {
        activity_id,
        day: now.date(),
        started_at: now,
    })
}

/// Decides which log stopping `activity` at `now` closes.
///
/// `today` holds every log filed under today's day bucket, for all activities.
/// A running log of `activity` is closed even when it started on an earlier
/// day, so a timer left running over midnight can still be stopped.
pub fn plan_stop(
    activity: &Activity,
    running: Option<&Running>,
    today: &[ActivityLog],
    now: NaiveDateTime,
) -> Result<ClosedLog, TrackingError> {
    let activity_id = saved_id(activity)?;

    if let Some(running) = running.filter(|r| r.log.activity_id == activity_id) {
        return close(activity, &running.log, now);
    }

    if today.is_empty() {
        return Err(TrackingError::NothingTrackedToday);
    }

    if let Some(running) = running {
        return Err(TrackingError::AlreadyTrackingOther {
            activity: running.activity.name.clone(),
        });
    }

    let latest = today
        .iter()
        .filter(|log| log.activity_id == activity_id)
        .max_by_key(|log| (log.started_at, log.id))
        .ok_or_else(|| TrackingError::ActivityNotStarted {
            activity: activity.name.clone(),
        })?;

    if !latest.is_open() {
        return Err(TrackingError::AlreadyStopped {
            activity: activity.name.clone(),
        });
    }

    close(activity, latest, now)
}

fn close(
    activity: &Activity,
    log: &ActivityLog,
    now: NaiveDateTime,
) -> Result<ClosedLog, TrackingError> {
    let duration_seconds = (now - log.started_at).num_seconds();
    if duration_seconds < 0 {
        return Err(TrackingError::NegativeDuration {
            activity: activity.name.clone(),
            started_at: log.started_at,
            stopped_at: now,
        });
    }
    Ok(ClosedLog {
        log_id: log.id,
        stopped_at: now,
        duration_seconds,
    })
}

fn saved_id(activity: &Activity) -> Result<ActivityId, TrackingError> {
    activity.id.ok_or_else(|| TrackingError::Unsaved {
        activity: activity.name.clone(),
    })
}
