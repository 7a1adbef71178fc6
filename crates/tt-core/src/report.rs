//! Aggregation of tracked logs into per-activity and per-day totals.
//!
//! The aggregate is format-agnostic; renderers consume [`Report`].

use std::cmp::Reverse;
use std::collections::HashMap;
use std::collections::hash_map::Entry;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, warn};

use crate::activity::{Activity, ActivityId};
use crate::period::Period;
use crate::store::ActivityStore;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("no data found in period {start} - {end}")]
    NoDataInPeriod { start: String, end: String },

    #[error("report format {format} is not supported yet")]
    FormatNotSupported { format: String },

    #[error("failed to read tracked data")]
    Store(#[source] BoxError),

    #[error("failed to write report")]
    Io(#[from] std::io::Error),

    #[error("failed to encode report")]
    Json(#[from] serde_json::Error),
}

impl ReportError {
    fn store(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Store(Box::new(err))
    }
}

/// Time spent on one activity across the whole period.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivitySummary {
    pub activity: Activity,
    pub total_seconds: i64,
    /// Share of the report's grand total, 0-100.
    pub percentage: f64,
}

impl ActivitySummary {
    /// Percentage with two decimals, e.g. `70.59%`.
    pub fn percentage_label(&self) -> String {
        format!("{:.2}%", self.percentage)
    }
}

/// Time spent on one activity within a single day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayEntry {
    pub activity: Activity,
    pub duration_seconds: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySummary {
    pub day: NaiveDate,
    /// Sorted by duration, longest first.
    pub entries: Vec<DayEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub period: Period,
    /// Sorted by total, longest first.
    pub activities: Vec<ActivitySummary>,
    /// Days with at least one entry, ascending.
    pub days: Vec<DaySummary>,
    pub total_seconds: i64,
}

/// Builds a [`Report`] for `period` from the closed logs in `store`.
///
/// Logs whose activity has been deleted are skipped. Ties keep the order in
/// which activities were first seen.
pub fn aggregate<S>(store: &S, period: &Period) -> Result<Report, ReportError>
where
    S: ActivityStore + ?Sized,
{
    let mut logs = store.logs_for_period(period).map_err(ReportError::store)?;
    let mut resolved: HashMap<ActivityId, Option<Activity>> = HashMap::new();
    let mut totals: Vec<(Activity, i64)> = Vec::new();
    let mut days = Vec::new();
    let mut saw_data = false;

    for day in period.days() {
        let Some(entries) = logs.remove(&day) else {
            continue;
        };
        if entries.is_empty() {
            continue;
        }
        saw_data = true;

        let mut day_entries: Vec<DayEntry> = Vec::new();
        for entry in entries {
            let Some(activity) = resolve(store, &mut resolved, entry.activity_id)? else {
                warn!(
                    activity_id = %entry.activity_id,
                    %day,
                    "Skipping log of deleted activity"
                );
                continue;
            };

            if let Some((_, total)) = totals.iter_mut().find(|(a, _)| a.id == activity.id) {
                *total += entry.duration_seconds;
            } else {
                totals.push((activity.clone(), entry.duration_seconds));
            }
            if let Some(existing) = day_entries.iter_mut().find(|e| e.activity.id == activity.id) {
                existing.duration_seconds += entry.duration_seconds;
            } else {
                day_entries.push(DayEntry {
                    activity,
                    duration_seconds: entry.duration_seconds,
                });
            }
        }

        if !day_entries.is_empty() {
            day_entries.sort_by_key(|e| Reverse(e.duration_seconds));
            days.push(DaySummary {
                day,
                entries: day_entries,
            });
        }
    }

    if !saw_data {
        return Err(ReportError::NoDataInPeriod {
            start: period.start_day(),
            end: period.end_day(),
        });
    }

    totals.sort_by_key(|(_, total)| Reverse(*total));
    let total_seconds: i64 = totals.iter().map(|(_, total)| total).sum();
    let activities = totals
        .into_iter()
        .map(|(activity, total)| ActivitySummary {
            activity,
            total_seconds: total,
            percentage: percentage(total, total_seconds),
        })
        .collect();

    debug!(days = days.len(), total_seconds, "Aggregated report");

    Ok(Report {
        period: *period,
        activities,
        days,
        total_seconds,
    })
}

fn resolve<S>(
    store: &S,
    resolved: &mut HashMap<ActivityId, Option<Activity>>,
    id: ActivityId,
) -> Result<Option<Activity>, ReportError>
where
    S: ActivityStore + ?Sized,
{
    match resolved.entry(id) {
        Entry::Occupied(slot) => Ok(slot.get().clone()),
        Entry::Vacant(slot) => {
            let activity = store.activity_by_id(id).map_err(ReportError::store)?;
            Ok(slot.insert(activity).clone())
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn percentage(part: i64, whole: i64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
