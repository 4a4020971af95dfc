// Per-tile-type processors behind one trait
pub mod metrics;
pub mod problems;
pub mod slo;

use crate::application::monitoring_backend::{BackendError, MonitoringBackend};
use crate::domain::criteria::{ThresholdParseError, ThresholdSpec};
use crate::domain::dashboard::Tile;
use crate::domain::evaluation::TimeWindow;
use crate::domain::scope::{ScopeFilter, ScopeResolutionError};
use crate::domain::sli::TileResult;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TileError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Scope(#[from] ScopeResolutionError),
    #[error("invalid threshold spec: {0}")]
    Threshold(#[from] ThresholdParseError),
    #[error("indicator '{0}' is emitted more than once by this tile")]
    DuplicateIndicator(String),
    #[error("no data: {0}")]
    NoData(String),
    #[error("tile processing exceeded {0:?}")]
    Timeout(Duration),
}

/// Everything a processor may need besides the tile and its merged scope.
#[derive(Clone)]
pub struct TileContext {
    pub backend: Arc<dyn MonitoringBackend>,
    pub window: TimeWindow,
    pub project: String,
    pub service: String,
    pub stage: String,
}

impl TileContext {
    /// Values for `${project}`, `${service}` and `${stage}` in tile queries.
    pub fn template_vars(&self) -> HashMap<String, String> {
        HashMap::from([
            ("project".to_string(), self.project.clone()),
            ("service".to_string(), self.service.clone()),
            ("stage".to_string(), self.stage.clone()),
        ])
    }
}

#[async_trait]
pub trait TileProcessor: Send + Sync {
    /// Produce the indicators of one tile. `scope` is the already merged,
    /// read-only filter for this tile.
    async fn process(
        &self,
        tile: &Tile,
        scope: &ScopeFilter,
        ctx: &TileContext,
    ) -> Result<Vec<TileResult>, TileError>;
}

/// Threshold spec embedded in a display name, if any.
pub fn threshold_from_name(name: &str) -> Result<Option<ThresholdSpec>, ThresholdParseError> {
    ThresholdSpec::extract_from_name(name).transpose()
}

pub fn ensure_unique_indicators(results: &[TileResult]) -> Result<(), TileError> {
    let mut seen = HashSet::new();
    for result in results {
        if !seen.insert(result.metric.as_str()) {
            return Err(TileError::DuplicateIndicator(result.metric.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use chrono::{TimeZone, Utc};

    pub fn window() -> TimeWindow {
        TimeWindow::new(
            Utc.with_ymd_and_hms(2026, 5, 4, 10, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 5, 4, 10, 30, 0).unwrap(),
        )
        .unwrap()
    }

    pub fn context(backend: Arc<dyn MonitoringBackend>) -> TileContext {
        TileContext {
            backend,
            window: window(),
            project: "sockshop".to_string(),
            service: "carts".to_string(),
            stage: "staging".to_string(),
        }
    }
}
