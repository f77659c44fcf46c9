use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::{AnalyticsError, Result};
use crate::pipeline::MetricsContext;
use crate::period::{parse_day, ReportPeriod};

/// Parameters of one analytics report, as supplied by the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    /// First day of the period, `YYYY-MM-DD`, inclusive.
    pub start_date: String,
    /// Last day of the period, `YYYY-MM-DD`, inclusive through 23:59:59.
    pub end_date: String,
    /// Items registered strictly after this date are flagged as new.
    pub new_product_cutoff: String,
    /// Stock location; the configured default when `None`.
    #[serde(default)]
    pub location: Option<String>,
}

impl ReportRequest {
    pub fn new(start_date: &str, end_date: &str, new_product_cutoff: &str) -> Self {
        Self {
            start_date: start_date.to_string(),
            end_date: end_date.to_string(),
            new_product_cutoff: new_product_cutoff.to_string(),
            location: None,
        }
    }

    /// Request whose new-product cutoff is `today` minus `window_days`.
    pub fn with_default_cutoff(start_date: &str, end_date: &str, today: NaiveDate, window_days: u64) -> Self {
        let cutoff = today.checked_sub_days(Days::new(window_days)).unwrap_or(NaiveDate::MIN);
        Self::new(start_date, end_date, &cutoff.format("%Y-%m-%d").to_string())
    }

    pub fn location(mut self, location: &str) -> Self {
        self.location = Some(location.to_string());
        self
    }

    /// Validate dates and settle the location against `config`.
    pub fn resolve(&self, config: &EngineConfig) -> Result<ResolvedRequest> {
        let period = ReportPeriod::parse(&self.start_date, &self.end_date)?;
        let cutoff = parse_day(&self.new_product_cutoff)?;
        let location = match self.location.as_deref().map(str::trim) {
            Some("") => {
                return Err(AnalyticsError::InvalidArgument("location must not be empty".into()))
            }
            Some(l) => l.to_string(),
            None => config.default_location.clone(),
        };
        Ok(ResolvedRequest {
            context: MetricsContext {
                period,
                new_product_cutoff: cutoff,
            },
            location,
        })
    }
}

/// A validated [`ReportRequest`].
#[derive(Debug, Clone)]
pub struct ResolvedRequest {
    pub context: MetricsContext,
    pub location: String,
}
