//! Date parsing, per-date filter windows, and the session time window.

use crate::error::{FloodError, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Spellings accepted besides ISO; ambiguous ones read month-first, then day-first
const ALT_DATE_FORMATS: &[&str] = &["%m-%d-%Y", "%d-%m-%Y", "%Y/%m/%d", "%m/%d/%Y", "%d/%m/%Y"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.fZ",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// A user supplied date, with or without a time-of-day component
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DateInput {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl DateInput {
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        for format in std::iter::once(&DATE_FORMAT).chain(ALT_DATE_FORMATS) {
            if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
                return Ok(DateInput::Date(date));
            }
        }
        for format in DATETIME_FORMATS {
            if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, format) {
                return Ok(DateInput::DateTime(datetime));
            }
        }
        if let Ok(datetime) = chrono::DateTime::parse_from_rfc3339(trimmed) {
            return Ok(DateInput::DateTime(datetime.naive_utc()));
        }
        Err(FloodError::InvalidDate { input: input.to_string() })
    }

    pub fn has_time(&self) -> bool {
        matches!(self, DateInput::DateTime(_))
    }

    /// Instant at which this input starts
    pub fn start(&self) -> NaiveDateTime {
        match self {
            DateInput::Date(date) => date.and_time(NaiveTime::MIN),
            DateInput::DateTime(datetime) => *datetime,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.start().date()
    }
}

impl FromStr for DateInput {
    type Err = FloodError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Half-open instant range `[start, end)` used to filter a collection by date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateWindow {
    /// One calendar day for date-only input, one second when a time is given
    pub fn for_input(input: &DateInput) -> Self {
        let start = input.start();
        let span = if input.has_time() { Duration::seconds(1) } else { Duration::days(1) };
        Self { start, end: start + span }
    }

    pub fn parse(input: &str) -> Result<Self> {
        Ok(Self::for_input(&DateInput::parse(input)?))
    }

    pub fn contains(&self, instant: &NaiveDateTime) -> bool {
        self.start <= *instant && *instant < self.end
    }
}

/// Calendar time window of a flood map session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl TimeWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start >= end {
            return Err(FloodError::DateOrder {
                start: start.format(DATE_FORMAT).to_string(),
                end: end.format(DATE_FORMAT).to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Parse `YYYY-mm-dd` start and end dates
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        let parse = |s: &str| {
            NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
                .map_err(|_| FloodError::InvalidDate { input: s.to_string() })
        };
        Self::new(parse(start)?, parse(end)?)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn start_str(&self) -> String {
        self.start.format(DATE_FORMAT).to_string()
    }

    pub fn end_str(&self) -> String {
        self.end.format(DATE_FORMAT).to_string()
    }

    /// Collection load range, end exclusive
    pub fn as_date_window(&self) -> DateWindow {
        DateWindow { start: self.start.and_time(NaiveTime::MIN), end: self.end.and_time(NaiveTime::MIN) }
    }

    /// Every calendar day from start to end, both inclusive
    pub fn days(&self) -> Vec<NaiveDate> {
        self.start.iter_days().take_while(|day| *day <= self.end).collect()
    }

    /// Whether a user date falls inside the window, the end day counted in full
    pub fn contains(&self, input: &DateInput) -> bool {
        let instant = input.start();
        let first = self.start.and_time(NaiveTime::MIN);
        let last = (self.end + Duration::days(1)).and_time(NaiveTime::MIN);
        first <= instant && instant < last
    }

    /// Check that every date lies inside the window, naming the first violation
    pub fn check_dates<S: AsRef<str>>(&self, dates: &[S]) -> Result<()> {
        for date in dates {
            let parsed = DateInput::parse(date.as_ref())?;
            if !self.contains(&parsed) {
                return Err(FloodError::DateOutOfRange {
                    date: date.as_ref().to_string(),
                    start: self.start_str(),
                    end: self.end_str(),
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.start_str(), self.end_str())
    }
}

/// Check whether dates lie within `[start_date, end_date]`
pub fn dates_within_daterange<S: AsRef<str>>(
    dates: &[S],
    start_date: &str,
    end_date: &str,
) -> Result<bool> {
    let window = TimeWindow::parse(start_date, end_date)?;
    window.check_dates(dates)?;
    Ok(true)
}

/// All days from `start_date` to `end_date` inclusive, formatted `YYYY-mm-dd`
pub fn dates_in_time_range(start_date: &str, end_date: &str) -> Result<Vec<String>> {
    let window = TimeWindow::parse(start_date, end_date)?;
    Ok(window.days().iter().map(|d| d.format(DATE_FORMAT).to_string()).collect())
}

/// Format an image timestamp the way the platform reports it
pub fn format_timestamp(instant: &NaiveDateTime) -> String {
    instant.format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}
