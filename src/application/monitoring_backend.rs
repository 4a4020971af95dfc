// Backend trait for dashboards, problems, metrics and SLOs
use crate::application::pagination::{PageRequest, QueryPage};
use crate::domain::dashboard::{Dashboard, DashboardSummary, SloSnapshot};
use crate::domain::evaluation::TimeWindow;
use crate::domain::telemetry::{MetricSeries, MetricsRequest, ProblemCategory, ProblemRecord};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("request to {endpoint} failed: {message}")]
    Transport { endpoint: String, message: String },
    #[error("{endpoint} answered with status {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },
    #[error("could not decode response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },
    #[error("request to {endpoint} timed out")]
    Timeout { endpoint: String },
    #[error("pagination protocol violation: {0}")]
    PaginationProtocol(String),
}

#[async_trait]
pub trait MonitoringBackend: Send + Sync {
    /// List every dashboard visible to the API token
    async fn list_dashboards(&self) -> Result<Vec<DashboardSummary>, BackendError>;

    /// Fetch one dashboard with all of its tiles
    async fn get_dashboard(&self, id: &str) -> Result<Dashboard, BackendError>;

    /// Fetch one page of problems or security problems
    async fn list_problems_page(
        &self,
        category: ProblemCategory,
        request: &PageRequest,
    ) -> Result<QueryPage<ProblemRecord>, BackendError>;

    /// Run a metrics query reduced to one value per series
    async fn query_metrics(&self, request: &MetricsRequest) -> Result<Vec<MetricSeries>, BackendError>;

    /// Evaluate a single SLO over the time window
    async fn get_slo(&self, id: &str, window: &TimeWindow) -> Result<SloSnapshot, BackendError>;
}
