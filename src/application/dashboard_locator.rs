// Dashboard lookup by id or by the KQG naming convention
use crate::application::monitoring_backend::{BackendError, MonitoringBackend};
use crate::domain::dashboard::DashboardSummary;
use crate::domain::evaluation::DashboardSelection;

const MARKER: &str = "kqg;";

/// Find the first dashboard named `KQG;project=..;service=..;stage=..[;...]`
/// for the given triple. Keys, values and the marker compare case-insensitively;
/// pair order and extra pairs do not matter.
pub fn find_matching_dashboard<'a>(
    dashboards: &'a [DashboardSummary],
    project: &str,
    service: &str,
    stage: &str,
) -> Option<&'a DashboardSummary> {
    let required = [
        ("project", project.to_lowercase()),
        ("service", service.to_lowercase()),
        ("stage", stage.to_lowercase()),
    ];

    let found = dashboards.iter().find(|dashboard| {
        let name = dashboard.name.to_lowercase();
        let Some(pairs) = name.strip_prefix(MARKER) else {
            return false;
        };

        let pairs: Vec<(&str, &str)> = pairs
            .split(';')
            .filter_map(|pair| pair.split_once('='))
            .map(|(k, v)| (k.trim(), v.trim()))
            .collect();

        required
            .iter()
            .all(|(key, value)| pairs.iter().any(|(k, v)| k == key && v == value))
    });

    if found.is_none() {
        tracing::warn!(
            project,
            stage,
            service,
            dashboard_count = dashboards.len(),
            "Found dashboards but none matched the name specification"
        );
    }

    found
}

/// Resolve the dashboard id for a run. An explicit id wins and skips the
/// dashboard listing altogether; `Ok(None)` means nothing matched.
pub async fn locate_dashboard(
    backend: &dyn MonitoringBackend,
    selection: &DashboardSelection,
    project: &str,
    service: &str,
    stage: &str,
) -> Result<Option<String>, BackendError> {
    match selection {
        DashboardSelection::Id(id) => {
            tracing::debug!(dashboard_id = %id, "Using configured dashboard");
            Ok(Some(id.clone()))
        }
        DashboardSelection::Find => {
            let dashboards = backend.list_dashboards().await?;
            Ok(find_matching_dashboard(&dashboards, project, service, stage).map(|d| d.id.clone()))
        }
    }
}
