//! Report periods: inclusive date ranges.

use chrono::{Months, NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

use crate::clock::Clock;

/// Date format accepted from users and files.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Keywords accepted by [`Period::from_keyword`].
pub const KEYWORDS: [&str; 4] = ["day", "week", "month", "year"];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PeriodError {
    #[error("invalid date '{value}', expected YYYY-MM-DD")]
    InvalidDate {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// A time range used to scope a report.
///
/// Always normalized so that `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Period {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl Period {
    /// Builds a period from two instants, swapping them if reversed.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        if start > end {
            Self {
                start: end,
                end: start,
            }
        } else {
            Self { start, end }
        }
    }

    /// Parses two `YYYY-MM-DD` dates (midnight of each day).
    pub fn from_date_strings(start: &str, end: &str) -> Result<Self, PeriodError> {
        let start = parse_date(start)?;
        let end = parse_date(end)?;
        Ok(Self::new(start.and_time(NaiveTime::MIN), end.and_time(NaiveTime::MIN)))
    }

    /// Builds a period ending now and reaching back by `keyword`.
    ///
    /// Unknown keywords, including the empty string, behave like `day`.
    pub fn from_keyword(keyword: &str, clock: &(impl Clock + ?Sized)) -> Self {
        let now = clock.now();
        let start = match keyword.to_lowercase().as_str() {
            "week" => now - chrono::Duration::days(7),
            "month" => now
                .checked_sub_months(Months::new(1))
                .unwrap_or(NaiveDateTime::MIN),
            "year" => now
                .checked_sub_months(Months::new(12))
                .unwrap_or(NaiveDateTime::MIN),
            _ => now - chrono::Duration::days(1),
        };
        Self::new(start, now)
    }

    pub const fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub const fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub const fn start_date(&self) -> NaiveDate {
        self.start.date()
    }

    pub const fn end_date(&self) -> NaiveDate {
        self.end.date()
    }

    pub fn start_day(&self) -> String {
        self.start.format(DATE_FORMAT).to_string()
    }

    pub fn end_day(&self) -> String {
        self.end.format(DATE_FORMAT).to_string()
    }

    /// Number of days covered.
    ///
    /// 1 when start and end fall on the same calendar day, otherwise the
    /// number of whole 24-hour spans between them (truncated).
    pub fn number_of_days(&self) -> i64 {
        if self.start.date() == self.end.date() {
            return 1;
        }
        (self.end - self.start).num_hours() / 24
    }

    /// Calendar days in the period, in ascending order.
    ///
    /// When [`Period::number_of_days`] is 1 only the start day is produced;
    /// otherwise every day from the start day to the end day inclusive.
    pub fn days(&self) -> Days {
        let last = if self.number_of_days() == 1 {
            self.start.date()
        } else {
            self.end.date()
        };
        Days {
            next: Some(self.start.date()),
            last,
        }
    }

    /// Calls `f` for every day of [`Period::days`], stopping at the first error.
    pub fn for_each_day<E, F>(&self, mut f: F) -> Result<(), E>
    where
        F: FnMut(NaiveDate) -> Result<(), E>,
    {
        for day in self.days() {
            f(day)?;
        }
        Ok(())
    }
}

/// Iterator over the calendar days of a [`Period`].
#[derive(Debug, Clone)]
pub struct Days {
    next: Option<NaiveDate>,
    last: NaiveDate,
}

impl Iterator for Days {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.filter(|day| *day <= self.last)?;
        self.next = current.succ_opt();
        Some(current)
    }
}

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Result<NaiveDate, PeriodError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|source| PeriodError::InvalidDate {
        value: value.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MockClock;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn number_of_days_is_one_for_same_day() {
        let period = Period::new(at("2020-10-10 08:00:00"), at("2020-10-10 23:00:00"));
        assert_eq!(period.number_of_days(), 1);
    }

    #[test]
    fn number_of_days_is_one_for_a_day_apart() {
        let period = Period::new(at("2020-10-09 12:00:00"), at("2020-10-10 12:00:00"));
        assert_eq!(period.number_of_days(), 1);
    }

    #[test]
    fn number_of_days_counts_whole_24_hour_spans() {
        let period = Period::from_date_strings("2020-10-10", "2020-10-20").unwrap();
        assert_eq!(period.number_of_days(), 10);

        // 47 hours apart truncates to a single day.
        let period = Period::new(at("2020-10-10 00:30:00"), at("2020-10-11 23:30:00"));
        assert_eq!(period.number_of_days(), 1);
    }

    #[test]
    fn from_date_strings_rejects_invalid_dates() {
        for (start, end) in [
            ("", "2020-10-10"),
            ("2020-10-10", ""),
            ("", ""),
            ("2020-06-32", "2020-10-10"),
            ("2020-06-30", "xxxx"),
        ] {
            assert!(
                matches!(
                    Period::from_date_strings(start, end),
                    Err(PeriodError::InvalidDate { .. })
                ),
                "{start:?}..{end:?} should be rejected"
            );
        }
    }

    #[test]
    fn from_date_strings_swaps_reversed_bounds() {
        let period = Period::from_date_strings("2020-06-30", "2020-06-29").unwrap();
        assert_eq!(period.start_date(), date("2020-06-29"));
        assert_eq!(period.end_date(), date("2020-06-30"));
        assert_eq!(period.start_day(), "2020-06-29");
        assert_eq!(period.end_day(), "2020-06-30");
    }

    #[test]
    fn from_date_strings_keeps_ordered_bounds() {
        let period = Period::from_date_strings("2020-06-29", "2020-06-30").unwrap();
        assert_eq!(period.start_date(), date("2020-06-29"));
        assert_eq!(period.end_date(), date("2020-06-30"));
    }

    #[test]
    fn unknown_keywords_default_to_day() {
        let clock = MockClock::new(at("2021-03-15 10:00:00"));
        let day = Period::from_keyword("day", &clock);
        assert_eq!(Period::from_keyword("", &clock), day);
        assert_eq!(Period::from_keyword("invalid", &clock), day);
        assert_eq!(day.start(), at("2021-03-14 10:00:00"));
        assert_eq!(day.end(), at("2021-03-15 10:00:00"));
    }

    #[test]
    fn keyword_periods_reach_back_from_now() {
        let clock = MockClock::new(at("2021-03-31 10:00:00"));

        let week = Period::from_keyword("WEEK", &clock);
        assert_eq!(week.start(), at("2021-03-24 10:00:00"));
        assert_eq!(week.end(), clock.now());

        // Calendar month arithmetic clamps to the end of February.
        let month = Period::from_keyword("month", &clock);
        assert_eq!(month.start(), at("2021-02-28 10:00:00"));

        let year = Period::from_keyword("year", &clock);
        assert_eq!(year.start(), at("2020-03-31 10:00:00"));
    }

    #[test]
    fn days_covers_inclusive_range() {
        let period = Period::from_date_strings("2020-10-10", "2020-10-15").unwrap();
        let days: Vec<_> = period.days().collect();
        assert_eq!(days.len(), 6);
        assert_eq!(days.first(), Some(&date("2020-10-10")));
        assert_eq!(days.last(), Some(&date("2020-10-15")));
        assert!(days.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn days_yields_only_start_day_when_single_day() {
        let period = Period::new(at("2020-10-09 12:00:00"), at("2020-10-10 12:00:00"));
        let days: Vec<_> = period.days().collect();
        assert_eq!(days, vec![date("2020-10-09")]);

        let same = Period::from_date_strings("2020-10-09", "2020-10-09").unwrap();
        assert_eq!(same.days().count(), 1);
    }

    #[test]
    fn days_is_restartable() {
        let period = Period::from_date_strings("2020-12-30", "2021-01-02").unwrap();
        let first: Vec<_> = period.days().collect();
        let second: Vec<_> = period.days().collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
    }

    #[test]
    fn for_each_day_stops_on_first_error() {
        let period = Period::from_date_strings("2020-10-10", "2020-10-20").unwrap();
        let mut seen = Vec::new();
        let result = period.for_each_day(|day| {
            seen.push(day);
            if day == date("2020-10-12") {
                Err("boom")
            } else {
                Ok(())
            }
        });
        assert_eq!(result, Err("boom"));
        assert_eq!(seen.len(), 3);
    }
}
