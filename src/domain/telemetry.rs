// Records returned by the monitoring backend
use super::evaluation::TimeWindow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProblemCategory {
    Problems,
    SecurityProblems,
}

impl ProblemCategory {
    /// Indicator name used when the tile carries no threshold spec.
    pub fn default_indicator(&self) -> &'static str {
        match self {
            ProblemCategory::Problems => "problems",
            ProblemCategory::SecurityProblems => "security_problems",
        }
    }

    /// Name of the selector query parameter on the list endpoint.
    pub fn selector_param(&self) -> &'static str {
        match self {
            ProblemCategory::Problems => "problemSelector",
            ProblemCategory::SecurityProblems => "securityProblemSelector",
        }
    }

    /// Prefix of the persisted SLI query string.
    pub fn query_prefix(&self) -> &'static str {
        match self {
            ProblemCategory::Problems => "PV2",
            ProblemCategory::SecurityProblems => "SECPV2",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProblemRecord {
    pub id: String,
    pub title: String,
    pub status: String,
}

/// A fully scoped metrics query.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsRequest {
    pub metric_selector: String,
    pub entity_selector: Option<String>,
    pub mz_selector: Option<String>,
    pub window: TimeWindow,
}

impl MetricsRequest {
    /// Persistable form, e.g. `MV2;;metricSelector=...&entitySelector=...`.
    pub fn to_sli_query(&self) -> String {
        let mut query = format!("MV2;;metricSelector={}", self.metric_selector);
        if let Some(entity_selector) = &self.entity_selector {
            query.push_str(&format!("&entitySelector={}", entity_selector));
        }
        if let Some(mz_selector) = &self.mz_selector {
            query.push_str(&format!("&mzSelector={}", mz_selector));
        }
        query
    }
}

/// One series of a metrics response, reduced to a single value (resolution=Inf).
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSeries {
    pub metric_id: String,
    pub dimensions: Vec<String>,
    pub value: Option<f64>,
}

impl MetricSeries {
    pub fn new(metric_id: impl Into<String>, dimensions: Vec<String>, value: Option<f64>) -> Self {
        Self {
            metric_id: metric_id.into(),
            dimensions,
            value,
        }
    }
}
