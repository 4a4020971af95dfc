// Data explorer and custom chart tiles
use super::{ensure_unique_indicators, threshold_from_name, TileContext, TileError, TileProcessor};
use crate::domain::dashboard::{Tile, TileKind};
use crate::domain::scope::ScopeFilter;
use crate::domain::sli::{clean_indicator_name, SloObjective, TileResult};
use crate::domain::telemetry::{MetricSeries, MetricsRequest};
use crate::infrastructure::config::prepare_query;
use async_trait::async_trait;

/// Runs the metric queries of a tile and maps every returned series to one
/// indicator. Series of a split query are named `<base>_<dimensions>`.
pub struct MetricTileProcessor;

struct RawQuery {
    metric_selector: String,
    entity_selector: Option<String>,
}

impl MetricTileProcessor {
    fn raw_queries(tile: &Tile) -> Result<(&str, Vec<RawQuery>), TileError> {
        match &tile.kind {
            TileKind::DataExplorer { queries } => Ok((
                tile.name.as_str(),
                queries
                    .iter()
                    .filter(|q| q.enabled)
                    .map(|q| RawQuery {
                        metric_selector: q.metric_selector.clone(),
                        entity_selector: q.entity_selector.clone(),
                    })
                    .collect(),
            )),
            TileKind::CustomCharting { custom_name, series } => {
                let display_name = if custom_name.trim().is_empty() {
                    tile.name.as_str()
                } else {
                    custom_name.as_str()
                };
                Ok((
                    display_name,
                    series
                        .iter()
                        .map(|s| RawQuery {
                            metric_selector: s.metric_selector(),
                            entity_selector: None,
                        })
                        .collect(),
                ))
            }
            other => Err(TileError::NoData(format!(
                "{} tile carries no metric queries",
                other.tile_type()
            ))),
        }
    }

    fn scoped_request(raw: &RawQuery, scope: &ScopeFilter, ctx: &TileContext) -> Result<MetricsRequest, TileError> {
        let vars = ctx.template_vars();
        let entity_selector = match &raw.entity_selector {
            Some(selector) => Some(format!(
                "{}{}",
                prepare_query(selector, &vars),
                scope.entity_selector_suffix()?
            )),
            None => None,
        };
        // without an entity selector the zone goes into mzSelector instead
        let mz_selector = match entity_selector {
            Some(_) => None,
            None => scope.mz_selector()?,
        };

        Ok(MetricsRequest {
            metric_selector: prepare_query(&raw.metric_selector, &vars),
            entity_selector,
            mz_selector,
            window: ctx.window,
        })
    }
}

fn indicator_name(base: &str, series: &MetricSeries, split: bool, multi_query: bool) -> String {
    let base = if base.is_empty() {
        clean_indicator_name(&series.metric_id)
    } else {
        base.to_string()
    };
    if !split {
        return base;
    }

    let suffix = if !series.dimensions.is_empty() {
        clean_indicator_name(&series.dimensions.join("_"))
    } else if multi_query {
        clean_indicator_name(&series.metric_id)
    } else {
        String::new()
    };

    if suffix.is_empty() {
        base
    } else {
        format!("{}_{}", base, suffix)
    }
}

#[async_trait]
impl TileProcessor for MetricTileProcessor {
    async fn process(
        &self,
        tile: &Tile,
        scope: &ScopeFilter,
        ctx: &TileContext,
    ) -> Result<Vec<TileResult>, TileError> {
        let (display_name, raw_queries) = Self::raw_queries(tile)?;
        if raw_queries.is_empty() {
            return Err(TileError::NoData("tile has no enabled metric queries".to_string()));
        }

        let threshold = threshold_from_name(display_name)?;
        let base = match &threshold {
            Some(spec) => spec.name.clone(),
            None => clean_indicator_name(display_name),
        };

        let mut collected = Vec::new();
        for raw in &raw_queries {
            let request = Self::scoped_request(raw, scope, ctx)?;
            let series = ctx.backend.query_metrics(&request).await?;
            tracing::debug!(
                metric_selector = %request.metric_selector,
                series = series.len(),
                "Metrics query returned"
            );
            collected.extend(series.into_iter().map(|s| (request.to_sli_query(), s)));
        }

        if collected.is_empty() {
            return Err(TileError::NoData("metrics query returned no series".to_string()));
        }

        let split = collected.len() > 1;
        let multi_query = raw_queries.len() > 1;
        let objective: Option<SloObjective> = threshold.map(Into::into);

        let results: Vec<TileResult> = collected
            .into_iter()
            .map(|(query, series)| {
                let name = indicator_name(&base, &series, split, multi_query);
                let result = match series.value {
                    Some(value) => TileResult::measured(name, value, query),
                    None => TileResult::no_data(name, query),
                };
                result.with_objective(objective.clone())
            })
            .collect();

        ensure_unique_indicators(&results)?;
        Ok(results)
    }
}
