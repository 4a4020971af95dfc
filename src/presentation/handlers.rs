// HTTP request handlers
use crate::application::dashboard_evaluator::EvaluationError;
use crate::application::monitoring_backend::BackendError;
use crate::application::sli_service::SliServiceError;
use crate::domain::evaluation::{DashboardSelection, EvaluationRequest, TimeWindow};
use crate::domain::sli::EvaluationReport;
use crate::presentation::app_state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct EvaluateBody {
    pub project: String,
    pub service: String,
    pub stage: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Dashboard id, `find`, or absent to use the service configuration.
    #[serde(default)]
    pub dashboard: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResponse {
    #[serde(flatten)]
    pub report: EvaluationReport,
    pub sli_definitions: BTreeMap<String, String>,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Evaluate the dashboard of one project/stage/service over a time window
pub async fn evaluate(State(state): State<Arc<AppState>>, Json(body): Json<EvaluateBody>) -> Response {
    let window = match TimeWindow::new(body.start, body.end) {
        Ok(window) => window,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };

    let request = EvaluationRequest {
        project: body.project,
        service: body.service,
        stage: body.stage,
        window,
        dashboard: body.dashboard.as_deref().and_then(DashboardSelection::from_setting),
    };

    match state.sli_service.evaluate(request).await {
        Ok(report) => {
            let sli_definitions = report.sli_definitions();
            (
                StatusCode::OK,
                Json(EvaluationResponse {
                    report,
                    sli_definitions,
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Evaluation failed");
            error_response(status_for(&e), e.to_string())
        }
    }
}

fn status_for(error: &SliServiceError) -> StatusCode {
    match error {
        SliServiceError::Evaluation(EvaluationError::DashboardNotFound { .. }) => StatusCode::NOT_FOUND,
        SliServiceError::Evaluation(EvaluationError::Backend(BackendError::Status { status: 404, .. })) => {
            StatusCode::NOT_FOUND
        }
        SliServiceError::Evaluation(EvaluationError::Backend(_)) | SliServiceError::Connect(_) => {
            StatusCode::BAD_GATEWAY
        }
        SliServiceError::Credentials(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
