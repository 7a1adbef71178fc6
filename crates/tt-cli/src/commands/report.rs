//! Report command for generating time reports.
//!
//! This module implements `tt report` over explicit dates or a keyword
//! period, rendered as terminal text, CSV or JSON. CSV and JSON reports are
//! written to a file in the configured report directory.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime, TimeZone};
use clap::Args;

use tt_core::period::{DATE_FORMAT, KEYWORDS};
use tt_core::{ActivityStore, DurationFormat, Period, Report, ReportError, aggregate};
use tt_db::Database;

use crate::Config;

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// First day of the report (YYYY-MM-DD).
    #[arg(requires = "end", conflicts_with = "period")]
    pub start: Option<String>,

    /// Last day of the report (YYYY-MM-DD).
    pub end: Option<String>,

    /// Period ending now: day, week, month or year. Without dates or a
    /// period this is `day`, the previous 24 hours, which reports only
    /// yesterday's logs. Pass explicit dates to include today.
    #[arg(short, long)]
    pub period: Option<String>,

    /// Output format: cli, csv or json.
    #[arg(short, long, default_value = "cli")]
    pub format: String,

    /// Duration format: a (auto), s, m or h. Defaults to the configured one.
    #[arg(short, long)]
    pub duration: Option<String>,
}

/// Report output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Cli,
    Csv,
    Json,
}

impl ReportFormat {
    /// File extension for formats written to disk, `None` for terminal output.
    pub const fn extension(self) -> Option<&'static str> {
        match self {
            Self::Cli => None,
            Self::Csv => Some("csv"),
            Self::Json => Some("json"),
        }
    }
}

impl FromStr for ReportFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cli" => Ok(Self::Cli),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(ReportError::FormatNotSupported {
                format: s.to_string(),
            }),
        }
    }
}

/// Aggregates a period from a store and renders it.
pub struct Reporter<'a, S: ?Sized> {
    store: &'a S,
    period: Period,
    format: ReportFormat,
    duration_format: DurationFormat,
}

impl<'a, S: ActivityStore + ?Sized> Reporter<'a, S> {
    pub const fn new(store: &'a S, period: Period) -> Self {
        Self {
            store,
            period,
            format: ReportFormat::Cli,
            duration_format: DurationFormat::Auto,
        }
    }

    pub const fn set_format(&mut self, format: ReportFormat) {
        self.format = format;
    }

    pub const fn set_duration_format(&mut self, duration_format: DurationFormat) {
        self.duration_format = duration_format;
    }

    pub fn build(&self) -> Result<Report, ReportError> {
        aggregate(self.store, &self.period)
    }

    pub fn render<W: Write>(&self, report: &Report, writer: &mut W) -> Result<(), ReportError> {
        match self.format {
            ReportFormat::Cli => render_cli(writer, report, self.duration_format),
            ReportFormat::Csv => render_csv(writer, report, self.duration_format),
            ReportFormat::Json => render_json(writer, report, self.duration_format),
        }
    }

    pub fn produce_report<W: Write>(&self, writer: &mut W) -> Result<(), ReportError> {
        let report = self.build()?;
        self.render(&report, writer)
    }
}

fn render_cli<W: Write>(
    writer: &mut W,
    report: &Report,
    duration_format: DurationFormat,
) -> Result<(), ReportError> {
    writeln!(writer, "Number of activities found: {}", report.activities.len())?;
    writeln!(writer, "Total time spent")?;
    for summary in &report.activities {
        write!(writer, "  {}", summary.activity.name)?;
        if let Some(description) = &summary.activity.description {
            write!(writer, " ({description})")?;
        }
        writeln!(
            writer,
            " - {} - ({})",
            duration_format.format(summary.total_seconds),
            summary.percentage_label()
        )?;
    }
    writeln!(writer)?;

    for day in &report.days {
        writeln!(writer, "Date: {}", day.day.format(DATE_FORMAT))?;
        for entry in &day.entries {
            writeln!(writer, "  Activity: {}", entry.activity.name)?;
            writeln!(
                writer,
                "  Total Duration: {}",
                duration_format.format(entry.duration_seconds)
            )?;
        }
    }
    Ok(())
}

fn render_csv<W: Write>(
    writer: &mut W,
    report: &Report,
    duration_format: DurationFormat,
) -> Result<(), ReportError> {
    // Names are restricted to [0-9a-zA-Z_-], so no field ever needs quoting.
    writeln!(writer, "date,activity,duration")?;
    for day in &report.days {
        for entry in &day.entries {
            writeln!(
                writer,
                "{},{},{}",
                day.day.format(DATE_FORMAT),
                entry.activity.name,
                duration_format.format(entry.duration_seconds)
            )?;
        }
    }
    Ok(())
}

fn render_json<W: Write>(
    writer: &mut W,
    report: &Report,
    duration_format: DurationFormat,
) -> Result<(), ReportError> {
    let days: BTreeMap<String, BTreeMap<&str, String>> = report
        .days
        .iter()
        .map(|day| {
            let entries = day
                .entries
                .iter()
                .map(|entry| {
                    (
                        entry.activity.name.as_str(),
                        duration_format.format(entry.duration_seconds),
                    )
                })
                .collect();
            (day.day.format(DATE_FORMAT).to_string(), entries)
        })
        .collect();
    serde_json::to_writer_pretty(&mut *writer, &days)?;
    writeln!(writer)?;
    Ok(())
}

/// `report_<start>_<end>_<unix>.<ext>` with dates as `YYYY_MM_DD`.
pub fn report_file_name(period: &Period, extension: &str, unix_seconds: i64) -> String {
    format!(
        "report_{}_{}_{unix_seconds}.{extension}",
        period.start().format("%Y_%m_%d"),
        period.end().format("%Y_%m_%d")
    )
}

fn unix_seconds(now: NaiveDateTime) -> i64 {
    Local
        .from_local_datetime(&now)
        .earliest()
        .map_or_else(|| now.and_utc().timestamp(), |local| local.timestamp())
}

pub fn run<W: Write>(
    writer: &mut W,
    args: &ReportArgs,
    db: &Database,
    config: &Config,
) -> Result<()> {
    let period = match (&args.start, &args.end) {
        (Some(start), Some(end)) => Period::from_date_strings(start, end)?,
        _ => {
            let keyword = args.period.as_deref().unwrap_or(KEYWORDS[0]);
            Period::from_keyword(keyword, db.clock())
        }
    };
    let format: ReportFormat = args.format.parse()?;
    let duration_format = DurationFormat::from_code(
        args.duration
            .as_deref()
            .unwrap_or(&config.duration_format),
    );
    tracing::debug!(?period, ?format, %duration_format, "Producing report");

    let mut reporter = Reporter::new(db, period);
    reporter.set_format(format);
    reporter.set_duration_format(duration_format);

    let Some(extension) = format.extension() else {
        reporter.produce_report(writer)?;
        return Ok(());
    };

    let report = reporter.build()?;
    std::fs::create_dir_all(&config.report_dir)
        .with_context(|| format!("failed to create {}", config.report_dir.display()))?;
    let file_name = report_file_name(&period, extension, unix_seconds(db.clock().now()));
    let path = config.report_dir.join(file_name);
    let file =
        File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut file = BufWriter::new(file);
    reporter.render(&report, &mut file)?;
    file.flush()?;

    writeln!(writer, "Report written to {}", path.display())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Duration;
    use insta::assert_snapshot;
    use tt_core::{Activity, MockClock};

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn track(db: &mut Database, clock: &MockClock, activity: &Activity, minutes: i64) {
        db.start(activity).unwrap();
        clock.advance(Duration::minutes(minutes));
        db.stop(activity).unwrap();
    }

    /// Three activities tracked over 2020-10-12..14, with the clock left at
    /// 2020-10-14 14:50.
    fn tracked_db() -> Database {
        let clock = MockClock::new(at("2020-10-12 09:00:00"));
        let mut db = Database::open_in_memory()
            .unwrap()
            .with_clock(clock.clone());
        let some_name = db
            .add(Activity::new("some_name").with_description("some description"))
            .unwrap();
        let activity2 = db.add(Activity::new("activity2")).unwrap();
        let activity3 = db.add(Activity::new("activity3")).unwrap();

        track(&mut db, &clock, &some_name, 60);
        track(&mut db, &clock, &activity2, 0);
        clock.set_now(at("2020-10-13 10:00:00"));
        track(&mut db, &clock, &some_name, 60);
        clock.set_now(at("2020-10-14 14:00:00"));
        track(&mut db, &clock, &activity3, 50);
        db
    }

    fn period() -> Period {
        Period::from_date_strings("2020-10-10", "2020-10-15").unwrap()
    }

    fn render(db: &Database, format: ReportFormat, duration_format: DurationFormat) -> String {
        let mut reporter = Reporter::new(db, period());
        reporter.set_format(format);
        reporter.set_duration_format(duration_format);
        let mut output = Vec::new();
        reporter.produce_report(&mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn cli_report_layout() {
        let db = tracked_db();
        let output = render(&db, ReportFormat::Cli, DurationFormat::Auto);
        assert_snapshot!(output, @r"
        Number of activities found: 3
        Total time spent
          some_name (some description) - 2h - (70.59%)
          activity3 - 50m - (29.41%)
          activity2 - 0s - (0.00%)

        Date: 2020-10-12
          Activity: some_name
          Total Duration: 1h
          Activity: activity2
          Total Duration: 0s
        Date: 2020-10-13
          Activity: some_name
          Total Duration: 1h
        Date: 2020-10-14
          Activity: activity3
          Total Duration: 50m
        ");
    }

    #[test]
    fn cli_report_leaves_out_logs_outside_the_period() {
        let clock = MockClock::new(at("2020-10-02 09:00:00"));
        let mut db = Database::open_in_memory()
            .unwrap()
            .with_clock(clock.clone());
        let some_name = db.add(Activity::new("some_name")).unwrap();
        let activity2 = db.add(Activity::new("activity2")).unwrap();
        let activity3 = db.add(Activity::new("activity3")).unwrap();

        track(&mut db, &clock, &some_name, 60);
        clock.set_now(at("2020-10-22 09:00:00"));
        track(&mut db, &clock, &some_name, 60);
        clock.set_now(at("2020-10-12 09:00:00"));
        track(&mut db, &clock, &some_name, 120);
        track(&mut db, &clock, &activity2, 0);
        clock.set_now(at("2020-10-13 09:00:00"));
        db.start(&activity3).unwrap();

        let output = render(&db, ReportFormat::Cli, DurationFormat::Auto);
        assert_snapshot!(output, @r"
        Number of activities found: 2
        Total time spent
          some_name - 2h - (100.00%)
          activity2 - 0s - (0.00%)

        Date: 2020-10-12
          Activity: some_name
          Total Duration: 2h
          Activity: activity2
          Total Duration: 0s
        ");
    }

    #[test]
    fn csv_report_has_one_row_per_day_and_activity() {
        let db = tracked_db();
        let output = render(&db, ReportFormat::Csv, DurationFormat::Seconds);
        assert_eq!(
            output,
            "date,activity,duration\n\
             2020-10-12,some_name,3600 seconds\n\
             2020-10-12,activity2,0 seconds\n\
             2020-10-13,some_name,3600 seconds\n\
             2020-10-14,activity3,3000 seconds\n"
        );
    }

    #[test]
    fn json_report_maps_days_to_activities() {
        let db = tracked_db();
        let output = render(&db, ReportFormat::Json, DurationFormat::Minutes);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "2020-10-12": { "some_name": "60 minutes", "activity2": "0 minutes" },
                "2020-10-13": { "some_name": "60 minutes" },
                "2020-10-14": { "activity3": "50 minutes" },
            })
        );
    }

    #[test]
    fn unknown_format_is_not_supported() {
        let err = "xml".parse::<ReportFormat>().unwrap_err();
        assert_eq!(err.to_string(), "report format xml is not supported yet");
        assert_eq!("JSON".parse::<ReportFormat>().unwrap(), ReportFormat::Json);
    }

    #[test]
    fn empty_period_fails() {
        let db = tracked_db();
        let mut reporter = Reporter::new(&db, Period::from_date_strings("2021-01-01", "2021-01-02").unwrap());
        reporter.set_format(ReportFormat::Cli);
        let mut output = Vec::new();

        let err = reporter.produce_report(&mut output).unwrap_err();
        assert!(matches!(err, ReportError::NoDataInPeriod { .. }));
        assert!(output.is_empty());
    }

    #[test]
    fn file_name_uses_underscored_dates() {
        assert_eq!(
            report_file_name(&period(), "csv", 1_602_720_000),
            "report_2020_10_10_2020_10_15_1602720000.csv"
        );
    }

    #[test]
    fn run_writes_json_report_to_report_dir() {
        let db = tracked_db();
        let temp = tempfile::tempdir().unwrap();
        let config = Config {
            report_dir: temp.path().join("reports"),
            ..Config::default()
        };
        let args = ReportArgs {
            start: Some("2020-10-10".to_string()),
            end: Some("2020-10-15".to_string()),
            period: None,
            format: "json".to_string(),
            duration: Some("h".to_string()),
        };
        let mut output = Vec::new();

        run(&mut output, &args, &db, &config).unwrap();

        let files: Vec<_> = std::fs::read_dir(&config.report_dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        assert_eq!(files.len(), 1);
        let name = files[0].file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("report_2020_10_10_2020_10_15_"), "{name}");
        assert!(name.ends_with(".json"), "{name}");

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&files[0]).unwrap()).unwrap();
        assert_eq!(written["2020-10-12"]["some_name"], "1 hours");

        let output = String::from_utf8(output).unwrap();
        assert!(output.starts_with("Report written to "));
    }

    #[test]
    fn run_uses_keyword_period_from_database_clock() {
        let db = tracked_db();
        let config = Config::default();
        let args = ReportArgs {
            start: None,
            end: None,
            period: Some("week".to_string()),
            format: "cli".to_string(),
            duration: None,
        };
        let mut output = Vec::new();

        run(&mut output, &args, &db, &config).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(output.starts_with("Number of activities found: 3\n"));
    }

    #[test]
    fn bare_report_covers_only_the_previous_day() {
        let db = tracked_db();
        let config = Config::default();
        let args = ReportArgs {
            start: None,
            end: None,
            period: None,
            format: "cli".to_string(),
            duration: None,
        };
        let mut output = Vec::new();

        run(&mut output, &args, &db, &config).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(output.starts_with("Number of activities found: 1\n"), "{output}");
        assert!(output.contains("Date: 2020-10-13"), "{output}");
        assert!(!output.contains("Date: 2020-10-14"), "{output}");
    }
}
