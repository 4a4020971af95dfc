// In-memory backend used by the application tests
use crate::application::monitoring_backend::{BackendError, MonitoringBackend};
use crate::application::pagination::{PageRequest, QueryPage};
use crate::domain::dashboard::{Dashboard, DashboardSummary, SloSnapshot};
use crate::domain::evaluation::TimeWindow;
use crate::domain::telemetry::{MetricSeries, MetricsRequest, ProblemCategory, ProblemRecord};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Default)]
pub struct FakeBackend {
    summaries: Vec<DashboardSummary>,
    dashboards: HashMap<String, Dashboard>,
    problems: HashMap<ProblemCategory, Result<Vec<Vec<ProblemRecord>>, BackendError>>,
    metrics: HashMap<String, Result<Vec<MetricSeries>, BackendError>>,
    metric_delays: HashMap<String, Duration>,
    slos: HashMap<String, SloSnapshot>,
    dashboard_list_calls: AtomicUsize,
    slo_calls: AtomicUsize,
    metrics_in_flight: AtomicUsize,
    peak_metrics_in_flight: AtomicUsize,
    page_requests: Mutex<Vec<(ProblemCategory, PageRequest)>>,
    metric_requests: Mutex<Vec<MetricsRequest>>,
}

pub fn problem(id: &str) -> ProblemRecord {
    ProblemRecord {
        id: id.to_string(),
        title: format!("problem {}", id),
        status: "OPEN".to_string(),
    }
}

pub fn status_error(endpoint: &str, status: u16) -> BackendError {
    BackendError::Status {
        endpoint: endpoint.to_string(),
        status,
        body: "backend unavailable".to_string(),
    }
}

impl FakeBackend {
    pub fn with_summaries(mut self, summaries: Vec<DashboardSummary>) -> Self {
        self.summaries = summaries;
        self
    }

    /// Registers the dashboard and a matching listing entry.
    pub fn with_dashboard(mut self, dashboard: Dashboard) -> Self {
        self.summaries.push(DashboardSummary {
            id: dashboard.id.clone(),
            name: dashboard.name.clone(),
            owner: "owner@example.com".to_string(),
        });
        self.dashboards.insert(dashboard.id.clone(), dashboard);
        self
    }

    /// Pages are served in order; page `i` hands out cursor `page-{i+1}`.
    pub fn with_problem_pages(mut self, category: ProblemCategory, pages: Vec<Vec<ProblemRecord>>) -> Self {
        self.problems.insert(category, Ok(pages));
        self
    }

    pub fn with_problem_error(mut self, category: ProblemCategory, error: BackendError) -> Self {
        self.problems.insert(category, Err(error));
        self
    }

    pub fn with_metric(mut self, selector: &str, series: Vec<MetricSeries>) -> Self {
        self.metrics.insert(selector.to_string(), Ok(series));
        self
    }

    pub fn with_metric_error(mut self, selector: &str, error: BackendError) -> Self {
        self.metrics.insert(selector.to_string(), Err(error));
        self
    }

    pub fn with_metric_delay(mut self, selector: &str, delay: Duration) -> Self {
        self.metric_delays.insert(selector.to_string(), delay);
        self
    }

    pub fn with_slo(mut self, id: &str, snapshot: SloSnapshot) -> Self {
        self.slos.insert(id.to_string(), snapshot);
        self
    }

    pub fn dashboard_list_calls(&self) -> usize {
        self.dashboard_list_calls.load(Ordering::SeqCst)
    }

    pub fn slo_calls(&self) -> usize {
        self.slo_calls.load(Ordering::SeqCst)
    }

    /// Highest number of `query_metrics` calls that were running at once.
    pub fn peak_metrics_in_flight(&self) -> usize {
        self.peak_metrics_in_flight.load(Ordering::SeqCst)
    }

    pub fn page_requests(&self) -> Vec<(ProblemCategory, PageRequest)> {
        self.page_requests.lock().unwrap().clone()
    }

    pub fn metric_requests(&self) -> Vec<MetricsRequest> {
        self.metric_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl MonitoringBackend for FakeBackend {
    async fn list_dashboards(&self) -> Result<Vec<DashboardSummary>, BackendError> {
        self.dashboard_list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.summaries.clone())
    }

    async fn get_dashboard(&self, id: &str) -> Result<Dashboard, BackendError> {
        self.dashboards
            .get(id)
            .cloned()
            .ok_or_else(|| status_error(&format!("/api/config/v1/dashboards/{}", id), 404))
    }

    async fn list_problems_page(
        &self,
        category: ProblemCategory,
        request: &PageRequest,
    ) -> Result<QueryPage<ProblemRecord>, BackendError> {
        self.page_requests.lock().unwrap().push((category, request.clone()));

        let pages = match self.problems.get(&category) {
            Some(Ok(pages)) => pages.clone(),
            Some(Err(error)) => return Err(error.clone()),
            None => vec![vec![]],
        };
        let index = match request {
            PageRequest::Initial(_) => 0,
            PageRequest::Cursor(key) => key
                .strip_prefix("page-")
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| status_error("/api/v2/problems", 400))?,
        };
        let items = pages
            .get(index)
            .cloned()
            .ok_or_else(|| status_error("/api/v2/problems", 400))?;
        let next_page_key = (index + 1 < pages.len()).then(|| format!("page-{}", index + 1));

        Ok(QueryPage {
            total_count: pages.iter().map(Vec::len).sum::<usize>() as u64,
            page_size: items.len() as u64,
            next_page_key,
            items,
        })
    }

    async fn query_metrics(&self, request: &MetricsRequest) -> Result<Vec<MetricSeries>, BackendError> {
        self.metric_requests.lock().unwrap().push(request.clone());
        let running = self.metrics_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_metrics_in_flight.fetch_max(running, Ordering::SeqCst);
        if let Some(delay) = self.metric_delays.get(&request.metric_selector) {
            tokio::time::sleep(*delay).await;
        }
        self.metrics_in_flight.fetch_sub(1, Ordering::SeqCst);
        self.metrics
            .get(&request.metric_selector)
            .cloned()
            .unwrap_or_else(|| Ok(vec![]))
    }

    async fn get_slo(&self, id: &str, _window: &TimeWindow) -> Result<SloSnapshot, BackendError> {
        self.slo_calls.fetch_add(1, Ordering::SeqCst);
        self.slos
            .get(id)
            .cloned()
            .ok_or_else(|| status_error(&format!("/api/v2/slo/{}", id), 404))
    }
}
