// Dynatrace REST client
use crate::application::credentials::DynatraceCredentials;
use crate::application::monitoring_backend::{BackendError, MonitoringBackend};
use crate::application::pagination::{PageRequest, QueryPage};
use crate::application::sli_service::BackendFactory;
use crate::domain::dashboard::{Dashboard, DashboardSummary, SloSnapshot};
use crate::domain::evaluation::TimeWindow;
use crate::domain::telemetry::{MetricSeries, MetricsRequest, ProblemCategory, ProblemRecord};
use crate::infrastructure::dynatrace_model::{
    DashboardDocument, DashboardListResponse, MetricsResponse, ProblemsPage, SloDocument,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

const NEXT_PAGE_KEY: &str = "nextPageKey";

#[derive(Debug, Clone)]
pub struct DynatraceClient {
    tenant: String,
    api_token: String,
    http: reqwest::Client,
}

impl DynatraceClient {
    pub fn new(credentials: &DynatraceCredentials, timeout: Duration) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Transport {
                endpoint: credentials.tenant.clone(),
                message: e.to_string(),
            })?;

        Ok(Self {
            tenant: credentials.tenant.trim_end_matches('/').to_string(),
            api_token: credentials.api_token.clone(),
            http,
        })
    }

    async fn execute_get<T: DeserializeOwned>(&self, path: &str, params: &[(String, String)]) -> Result<T, BackendError> {
        let url = format!("{}{}", self.tenant, path);
        tracing::debug!(endpoint = path, params = ?params, "Calling Dynatrace API");

        let response = self
            .http
            .get(&url)
            .header("Authorization", format!("Api-Token {}", self.api_token))
            .header("Accept", "application/json")
            .query(params)
            .send()
            .await
            .map_err(|e| request_error(path, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                endpoint: path.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        response.json::<T>().await.map_err(|e| {
            if e.is_timeout() {
                BackendError::Timeout {
                    endpoint: path.to_string(),
                }
            } else {
                BackendError::Decode {
                    endpoint: path.to_string(),
                    message: e.to_string(),
                }
            }
        })
    }
}

fn request_error(endpoint: &str, error: reqwest::Error) -> BackendError {
    if error.is_timeout() {
        BackendError::Timeout {
            endpoint: endpoint.to_string(),
        }
    } else {
        BackendError::Transport {
            endpoint: endpoint.to_string(),
            message: error.to_string(),
        }
    }
}

fn problems_endpoint(category: ProblemCategory) -> &'static str {
    match category {
        ProblemCategory::Problems => "/api/v2/problems",
        ProblemCategory::SecurityProblems => "/api/v2/securityProblems",
    }
}

fn window_params(window: &TimeWindow) -> [(String, String); 2] {
    [
        ("from".to_string(), window.from_millis()),
        ("to".to_string(), window.to_millis()),
    ]
}

/// Query parameters for one page. A cursor request carries the cursor only.
pub fn page_params(selector_param: &str, request: &PageRequest) -> Vec<(String, String)> {
    match request {
        PageRequest::Initial(query) => {
            let mut params = vec![(selector_param.to_string(), query.selector.clone())];
            params.extend(window_params(&query.window));
            if !query.fields.is_empty() {
                params.push(("fields".to_string(), query.fields.join(",")));
            }
            params
        }
        PageRequest::Cursor(key) => vec![(NEXT_PAGE_KEY.to_string(), key.clone())],
    }
}

/// The API rejects `nextPageKey` next to any other query parameter.
pub fn validate_page_params(params: &[(String, String)]) -> Result<(), BackendError> {
    let has_cursor = params.iter().any(|(key, _)| key == NEXT_PAGE_KEY);
    if has_cursor && params.len() > 1 {
        let extra: Vec<&str> = params
            .iter()
            .map(|(key, _)| key.as_str())
            .filter(|key| *key != NEXT_PAGE_KEY)
            .collect();
        return Err(BackendError::PaginationProtocol(format!(
            "{} must be sent alone, got {}",
            NEXT_PAGE_KEY,
            extra.join(", ")
        )));
    }
    Ok(())
}

#[async_trait]
impl MonitoringBackend for DynatraceClient {
    async fn list_dashboards(&self) -> Result<Vec<DashboardSummary>, BackendError> {
        let response: DashboardListResponse = self.execute_get("/api/config/v1/dashboards", &[]).await?;
        Ok(response.dashboards.into_iter().map(DashboardSummary::from).collect())
    }

    async fn get_dashboard(&self, id: &str) -> Result<Dashboard, BackendError> {
        let path = format!("/api/config/v1/dashboards/{}", urlencoding::encode(id));
        let document: DashboardDocument = self.execute_get(&path, &[]).await?;
        Ok(document.into())
    }

    async fn list_problems_page(
        &self,
        category: ProblemCategory,
        request: &PageRequest,
    ) -> Result<QueryPage<ProblemRecord>, BackendError> {
        let params = page_params(category.selector_param(), request);
        validate_page_params(&params)?;

        let page: ProblemsPage = self.execute_get(problems_endpoint(category), &params).await?;
        Ok(page.into())
    }

    async fn query_metrics(&self, request: &MetricsRequest) -> Result<Vec<MetricSeries>, BackendError> {
        let mut params = vec![("metricSelector".to_string(), request.metric_selector.clone())];
        if let Some(entity_selector) = &request.entity_selector {
            params.push(("entitySelector".to_string(), entity_selector.clone()));
        }
        if let Some(mz_selector) = &request.mz_selector {
            params.push(("mzSelector".to_string(), mz_selector.clone()));
        }
        params.extend(window_params(&request.window));
        params.push(("resolution".to_string(), "Inf".to_string()));

        let response: MetricsResponse = self.execute_get("/api/v2/metrics/query", &params).await?;
        Ok(response.into_series())
    }

    async fn get_slo(&self, id: &str, window: &TimeWindow) -> Result<SloSnapshot, BackendError> {
        let path = format!("/api/v2/slo/{}", urlencoding::encode(id));
        let mut params = window_params(window).to_vec();
        params.push(("timeFrame".to_string(), "GTF".to_string()));

        let slo: SloDocument = self.execute_get(&path, &params).await?;
        Ok(slo.into())
    }
}

/// Builds one client per evaluation from the resolved credentials.
#[derive(Debug, Clone)]
pub struct DynatraceClientFactory {
    request_timeout: Duration,
}

impl DynatraceClientFactory {
    pub fn new(request_timeout: Duration) -> Self {
        Self { request_timeout }
    }
}

impl BackendFactory for DynatraceClientFactory {
    fn connect(&self, credentials: &DynatraceCredentials) -> Result<Arc<dyn MonitoringBackend>, BackendError> {
        let client = DynatraceClient::new(credentials, self.request_timeout)?;
        Ok(Arc::new(client))
    }
}
