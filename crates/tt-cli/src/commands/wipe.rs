//! Wipe command for deleting tracked time inside a period.

use std::io::Write;

use anyhow::{Result, bail};
use clap::Args;

use tt_core::{ActivityStore, Period};
use tt_db::Database;

#[derive(Debug, Args)]
pub struct WipeArgs {
    /// First day to wipe (YYYY-MM-DD).
    pub start: String,
    /// Last day to wipe (YYYY-MM-DD).
    pub end: String,
    /// Only wipe time tracked for this activity (name or alias).
    #[arg(short, long)]
    pub activity: Option<String>,
    /// Confirm the deletion.
    #[arg(long)]
    pub yes: bool,
}

pub fn run<W: Write>(writer: &mut W, args: &WipeArgs, db: &mut Database) -> Result<()> {
    let period = Period::from_date_strings(&args.start, &args.end)?;
    let activity = args
        .activity
        .as_deref()
        .map(|name| db.find(name))
        .transpose()?;

    if !args.yes {
        bail!(
            "refusing to wipe logs between {} and {} without --yes",
            period.start_day(),
            period.end_day()
        );
    }

    let deleted = db.wipe_logs(&period, activity.as_ref())?;
    writeln!(
        writer,
        "Wiped {deleted} log(s) between {} and {}",
        period.start_day(),
        period.end_day()
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{Duration, NaiveDateTime};
    use tt_core::{Activity, MockClock};

    fn args(activity: Option<&str>, yes: bool) -> WipeArgs {
        WipeArgs {
            start: "2020-10-12".to_string(),
            end: "2020-10-10".to_string(),
            activity: activity.map(String::from),
            yes,
        }
    }

    fn tracked_db() -> Database {
        let now = NaiveDateTime::parse_from_str("2020-10-12 09:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        let clock = MockClock::new(now);
        let mut db = Database::open_in_memory()
            .unwrap()
            .with_clock(clock.clone());
        for name in ["reading", "coding"] {
            let activity = db.add(Activity::new(name)).unwrap();
            db.start(&activity).unwrap();
            clock.advance(Duration::minutes(10));
            db.stop(&activity).unwrap();
        }
        db
    }

    #[test]
    fn wipe_requires_confirmation() {
        let mut db = tracked_db();
        let mut output = Vec::new();

        let err = run(&mut output, &args(None, false), &mut db).unwrap_err();
        assert_eq!(
            err.to_string(),
            "refusing to wipe logs between 2020-10-10 and 2020-10-12 without --yes"
        );
    }

    #[test]
    fn wipe_single_activity() {
        let mut db = tracked_db();
        let mut output = Vec::new();

        run(&mut output, &args(Some("reading"), true), &mut db).unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Wiped 1 log(s) between 2020-10-10 and 2020-10-12\n"
        );
    }

    #[test]
    fn wipe_rejects_invalid_dates() {
        let mut db = tracked_db();
        let mut output = Vec::new();
        let mut invalid = args(None, true);
        invalid.end = "2020-13-01".to_string();

        let err = run(&mut output, &invalid, &mut db).unwrap_err();
        assert!(err.to_string().contains("invalid date '2020-13-01'"));
    }
}
