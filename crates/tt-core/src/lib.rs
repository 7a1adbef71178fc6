//! Core domain logic for the time tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Activities and their aliases
//! - Periods: date ranges that scope reports
//! - Tracking: the start/stop rules for the single running timer
//! - Reports: aggregating closed logs into per-activity and per-day totals

pub mod activity;
pub mod alias_index;
pub mod clock;
pub mod duration_format;
pub mod period;
pub mod report;
pub mod store;
pub mod tracking;

pub use activity::{Activity, ActivityId, ActivityUpdate, ValidationError};
pub use alias_index::{AliasError, AliasIndex};
pub use clock::{Clock, MockClock, SystemClock};
pub use duration_format::DurationFormat;
pub use period::{Period, PeriodError};
pub use report::{ActivitySummary, DayEntry, DaySummary, Report, ReportError, aggregate};
pub use store::{ActivityStore, LogEntry};
pub use tracking::{ActivityLog, ClosedLog, NewLog, Running, TrackingError};
