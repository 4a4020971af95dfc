// Dashboard evaluation - locate, fetch, dispatch tiles, aggregate the report
use crate::application::dashboard_locator::locate_dashboard;
use crate::application::monitoring_backend::{BackendError, MonitoringBackend};
use crate::application::tile_dispatcher::{TileDispatcher, TileOutcome};
use crate::application::tile_processing::TileContext;
use crate::domain::evaluation::{DashboardSelection, EvaluationRequest};
use crate::domain::sli::{EvaluationReport, ReportBuilder};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("no dashboard matches project '{project}', service '{service}' and stage '{stage}'")]
    DashboardNotFound {
        project: String,
        service: String,
        stage: String,
    },
    #[error(transparent)]
    Backend(#[from] BackendError),
}

#[derive(Clone)]
pub struct DashboardEvaluator {
    dispatcher: TileDispatcher,
}

impl DashboardEvaluator {
    pub fn new(dispatcher: TileDispatcher) -> Self {
        Self { dispatcher }
    }

    /// Only a missing dashboard or a failure to list/fetch it aborts the run;
    /// tile failures end up in the report's skipped list.
    pub async fn evaluate(
        &self,
        backend: Arc<dyn MonitoringBackend>,
        request: &EvaluationRequest,
    ) -> Result<EvaluationReport, EvaluationError> {
        let selection = request.dashboard.clone().unwrap_or(DashboardSelection::Find);
        let dashboard_id = locate_dashboard(
            backend.as_ref(),
            &selection,
            &request.project,
            &request.service,
            &request.stage,
        )
        .await?
        .ok_or_else(|| EvaluationError::DashboardNotFound {
            project: request.project.clone(),
            service: request.service.clone(),
            stage: request.stage.clone(),
        })?;

        let dashboard = backend.get_dashboard(&dashboard_id).await?;
        tracing::info!(
            dashboard_id = %dashboard.id,
            dashboard = %dashboard.name,
            tiles = dashboard.tiles.len(),
            "Evaluating dashboard"
        );

        let ctx = TileContext {
            backend,
            window: request.window,
            project: request.project.clone(),
            service: request.service.clone(),
            stage: request.stage.clone(),
        };
        let outcomes = self.dispatcher.dispatch(&dashboard, &ctx).await;

        let mut report = ReportBuilder::new(dashboard.id.clone());
        for (index, (tile, outcome)) in dashboard.tiles.iter().zip(outcomes).enumerate() {
            match outcome {
                TileOutcome::Indicators(results) => report.add_tile(index, &tile.name, results),
                TileOutcome::Failed(reason) => report.skip(index, &tile.name, reason),
                TileOutcome::Ignored => {}
            }
        }

        let report = report.build();
        tracing::info!(
            dashboard_id = %report.dashboard_id,
            indicators = report.indicators.len(),
            skipped = report.skipped.len(),
            "Dashboard evaluated"
        );
        Ok(report)
    }
}
