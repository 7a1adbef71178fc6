//! Stop command for ending the running timer.

use std::io::Write;

use anyhow::Result;

use tt_core::ActivityStore;
use tt_db::Database;

use super::start::TrackArgs;

pub fn run<W: Write>(writer: &mut W, args: &TrackArgs, db: &mut Database) -> Result<()> {
    let activity = db.find(&args.activity)?;
    db.stop(&activity)?;
    writeln!(writer, "Stopped tracking {}", activity.name)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{Duration, NaiveDateTime};
    use tt_core::{Activity, MockClock, Period};

    fn args(activity: &str) -> TrackArgs {
        TrackArgs {
            activity: activity.to_string(),
        }
    }

    #[test]
    fn stop_closes_the_running_log() {
        let now = NaiveDateTime::parse_from_str("2020-10-12 09:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        let clock = MockClock::new(now);
        let mut db = Database::open_in_memory()
            .unwrap()
            .with_clock(clock.clone());
        let reading = db.add(Activity::new("reading")).unwrap();
        db.start(&reading).unwrap();
        clock.advance(Duration::minutes(45));

        let mut output = Vec::new();
        run(&mut output, &args("reading"), &mut db).unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Stopped tracking reading\n"
        );
        let period = Period::from_date_strings("2020-10-12", "2020-10-12").unwrap();
        let logs = db.logs_for_period(&period).unwrap();
        assert_eq!(logs.values().flatten().next().unwrap().duration_seconds, 2700);
    }

    #[test]
    fn stop_without_any_log_today() {
        let mut db = Database::open_in_memory().unwrap();
        db.add(Activity::new("reading")).unwrap();

        let mut output = Vec::new();
        let err = run(&mut output, &args("reading"), &mut db).unwrap_err();
        assert_eq!(err.to_string(), "no activity started yet today");
    }
}
