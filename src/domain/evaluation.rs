// Evaluation request: the triple, the time window and the dashboard choice
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("time window start {start} is not before end {end}")]
pub struct InvalidTimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, InvalidTimeWindow> {
        if start >= end {
            return Err(InvalidTimeWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// Backend `from` parameter (epoch millis).
    pub fn from_millis(&self) -> String {
        self.start.timestamp_millis().to_string()
    }

    /// Backend `to` parameter (epoch millis).
    pub fn to_millis(&self) -> String {
        self.end.timestamp_millis().to_string()
    }
}

/// How the dashboard for a run is chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardSelection {
    /// Use this dashboard directly, no name matching.
    Id(String),
    /// Match dashboard names against the `KQG;` convention.
    Find,
}

impl DashboardSelection {
    /// Interpret a `dashboard` setting: empty means "not set", `find` forces
    /// name matching and anything else is taken as an identifier.
    pub fn from_setting(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            None
        } else if value.eq_ignore_ascii_case("find") {
            Some(DashboardSelection::Find)
        } else {
            Some(DashboardSelection::Id(value.to_string()))
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationRequest {
    pub project: String,
    pub service: String,
    pub stage: String,
    pub window: TimeWindow,
    pub dashboard: Option<DashboardSelection>,
}
