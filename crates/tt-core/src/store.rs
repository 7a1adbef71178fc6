//! Storage capability consumed by tracking and reporting.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::activity::{Activity, ActivityId, ActivityUpdate};
use crate::period::Period;

/// A closed log reduced to what reports need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogEntry {
    pub activity_id: ActivityId,
    pub duration_seconds: i64,
}

/// Persistence for activities and their logs.
///
/// Lookups by `name_or_alias` try the canonical name first, then the alias
/// index, both case-insensitively.
pub trait ActivityStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Resolves an activity. A missing activity is an error.
    fn find(&self, name_or_alias: &str) -> Result<Activity, Self::Error>;

    /// Looks up an activity by id, `None` when it has been deleted.
    fn activity_by_id(&self, id: ActivityId) -> Result<Option<Activity>, Self::Error>;

    /// Validates and stores a new activity, returning it with its id.
    fn add(&mut self, activity: Activity) -> Result<Activity, Self::Error>;

    fn update(
        &mut self,
        name_or_alias: &str,
        update: &ActivityUpdate,
    ) -> Result<Activity, Self::Error>;

    fn delete(&mut self, name_or_alias: &str) -> Result<(), Self::Error>;

    /// All activities ordered by name.
    fn list(&self) -> Result<Vec<Activity>, Self::Error>;

    fn start(&mut self, activity: &Activity) -> Result<(), Self::Error>;

    fn stop(&mut self, activity: &Activity) -> Result<(), Self::Error>;

    /// Closed logs whose day falls inside the period, grouped by day.
    fn logs_for_period(
        &self,
        period: &Period,
    ) -> Result<BTreeMap<NaiveDate, Vec<LogEntry>>, Self::Error>;

    fn currently_tracked_activity(&self) -> Result<Option<Activity>, Self::Error>;
}
