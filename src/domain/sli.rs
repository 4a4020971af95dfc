// SLI results and the aggregated evaluation report
use super::criteria::{Criterion, ThresholdSpec};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SloObjective {
    pub pass: Vec<Criterion>,
    pub warning: Vec<Criterion>,
    pub key: bool,
}

impl From<ThresholdSpec> for SloObjective {
    fn from(spec: ThresholdSpec) -> Self {
        Self {
            pass: spec.pass,
            warning: spec.warning,
            key: spec.key,
        }
    }
}

/// One measured indicator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TileResult {
    pub metric: String,
    pub value: f64,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slo_objective: Option<SloObjective>,
    pub query: String,
}

impl TileResult {
    pub fn measured(metric: impl Into<String>, value: f64, query: impl Into<String>) -> Self {
        Self {
            metric: metric.into(),
            value,
            success: true,
            slo_objective: None,
            query: query.into(),
        }
    }

    /// Query ran but produced no value.
    pub fn no_data(metric: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            success: false,
            ..Self::measured(metric, 0.0, query)
        }
    }

    pub fn with_objective(mut self, objective: Option<SloObjective>) -> Self {
        self.slo_objective = objective;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedTile {
    pub tile_index: usize,
    pub tile_title: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationReport {
    pub dashboard_id: String,
    pub indicators: Vec<TileResult>,
    pub skipped: Vec<SkippedTile>,
}

impl EvaluationReport {
    /// Indicator name to query, the content of a regenerated SLI file.
    pub fn sli_definitions(&self) -> BTreeMap<String, String> {
        self.indicators
            .iter()
            .map(|r| (r.metric.clone(), r.query.clone()))
            .collect()
    }
}

/// Collects per-tile outcomes in tile order and keeps indicator names unique.
#[derive(Debug)]
pub struct ReportBuilder {
    dashboard_id: String,
    indicators: Vec<TileResult>,
    skipped: Vec<SkippedTile>,
    emitted: HashSet<String>,
}

impl ReportBuilder {
    pub fn new(dashboard_id: impl Into<String>) -> Self {
        Self {
            dashboard_id: dashboard_id.into(),
            indicators: Vec::new(),
            skipped: Vec::new(),
            emitted: HashSet::new(),
        }
    }

    /// Adds all results of a tile, or records the tile as skipped when one of
    /// its indicator names was already emitted by an earlier tile.
    pub fn add_tile(&mut self, tile_index: usize, tile_title: &str, results: Vec<TileResult>) {
        if let Some(duplicate) = results.iter().find(|r| self.emitted.contains(&r.metric)) {
            let reason = format!("duplicate indicator '{}'", duplicate.metric);
            self.skip(tile_index, tile_title, reason);
            return;
        }

        for result in results {
            self.emitted.insert(result.metric.clone());
            self.indicators.push(result);
        }
    }

    pub fn skip(&mut self, tile_index: usize, tile_title: &str, reason: impl Into<String>) {
        self.skipped.push(SkippedTile {
            tile_index,
            tile_title: tile_title.to_string(),
            reason: reason.into(),
        });
    }

    pub fn build(self) -> EvaluationReport {
        EvaluationReport {
            dashboard_id: self.dashboard_id,
            indicators: self.indicators,
            skipped: self.skipped,
        }
    }
}

/// Lower-case, `_` for anything that is not alphanumeric, no leading,
/// trailing or doubled underscores.
pub fn clean_indicator_name(raw: &str) -> String {
    let mapped: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();

    mapped
        .split('_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}
