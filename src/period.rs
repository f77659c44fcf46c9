//! Report period and date handling.

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{AnalyticsError, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Inclusive date range of one report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReportPeriod {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(AnalyticsError::InvalidArgument(format!(
                "end date {end} is before start date {start}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse `YYYY-MM-DD` boundaries.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(parse_day(start)?, parse_day(end)?)
    }

    /// Length used for per-day averages: `max(1, ceil(end - start))` in days.
    pub fn days_diff(&self) -> u32 {
        let days = (self.end - self.start).num_days();
        days.max(1) as u32
    }

    /// Lower bound for movement filters: start of the first day.
    pub fn start_bound(&self) -> String {
        format!("{} 00:00:00", self.start.format(DATE_FORMAT))
    }

    /// Upper bound for movement filters: the end date extended to end of day.
    pub fn end_bound(&self) -> String {
        format!("{} 23:59:59", self.end.format(DATE_FORMAT))
    }
}

/// Parse a strict `YYYY-MM-DD` request date.
pub fn parse_day(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|e| AnalyticsError::InvalidArgument(format!("invalid date '{value}': {e}")))
}

/// Parse a stored date or timestamp leniently.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS`, the `T`-separated form and
/// trailing fractions or offsets. Bare dates resolve to midnight.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.len() < 10 {
        return None;
    }
    let date = NaiveDate::parse_from_str(value.get(..10)?, DATE_FORMAT).ok()?;
    let time = value
        .get(11..19)
        .and_then(|t| chrono::NaiveTime::parse_from_str(t, "%H:%M:%S").ok());
    match time {
        Some(t) => Some(date.and_time(t)),
        None => date.and_hms_opt(0, 0, 0),
    }
}

/// Date part of a stored date or timestamp.
pub fn parse_date_prefix(value: &str) -> Option<NaiveDate> {
    parse_timestamp(value).map(|ts| ts.date())
}
