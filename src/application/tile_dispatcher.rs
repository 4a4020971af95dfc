// Tile dispatch - routes tiles to their processor and isolates failures
use crate::application::tile_processing::metrics::MetricTileProcessor;
use crate::application::tile_processing::problems::ProblemTileProcessor;
use crate::application::tile_processing::slo::SloTileProcessor;
use crate::application::tile_processing::{TileContext, TileError, TileProcessor};
use crate::domain::dashboard::{Dashboard, Tile, TileType};
use crate::domain::scope::ScopeFilter;
use crate::domain::sli::TileResult;
use crate::domain::telemetry::ProblemCategory;
use futures::{FutureExt, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum TileOutcome {
    Indicators(Vec<TileResult>),
    Failed(String),
    /// Not an SLI tile (markdown, header, unknown type).
    Ignored,
}

#[derive(Clone)]
pub struct TileDispatcher {
    processors: HashMap<TileType, Arc<dyn TileProcessor>>,
    max_concurrency: usize,
    tile_timeout: Duration,
}

impl TileDispatcher {
    pub fn new(max_concurrency: usize, tile_timeout: Duration) -> Self {
        Self {
            processors: HashMap::new(),
            max_concurrency: max_concurrency.max(1),
            tile_timeout,
        }
    }

    /// Dispatcher with a handler for every SLI tile type.
    pub fn with_default_processors(max_concurrency: usize, tile_timeout: Duration) -> Self {
        let metrics: Arc<dyn TileProcessor> = Arc::new(MetricTileProcessor);
        Self::new(max_concurrency, tile_timeout)
            .register(
                TileType::OpenProblems,
                Arc::new(ProblemTileProcessor::new(ProblemCategory::Problems)),
            )
            .register(
                TileType::OpenSecurityProblems,
                Arc::new(ProblemTileProcessor::new(ProblemCategory::SecurityProblems)),
            )
            .register(TileType::DataExplorer, metrics.clone())
            .register(TileType::CustomCharting, metrics)
            .register(TileType::Slo, Arc::new(SloTileProcessor))
    }

    pub fn register(mut self, tile_type: TileType, processor: Arc<dyn TileProcessor>) -> Self {
        self.processors.insert(tile_type, processor);
        self
    }

    /// Process all tiles, at most `max_concurrency` at a time. The returned
    /// outcomes are in dashboard order whatever the completion order was.
    pub async fn dispatch(&self, dashboard: &Dashboard, ctx: &TileContext) -> Vec<TileOutcome> {
        let mut slots: Vec<Option<TileOutcome>> = dashboard.tiles.iter().map(|_| None).collect();

        // futures are built up front so the stream holds no borrowing closure
        let tasks: Vec<_> = dashboard
            .tiles
            .iter()
            .enumerate()
            .map(|(index, tile)| {
                self.process_tile(index, tile, &dashboard.filter, ctx)
                    .map(move |outcome| (index, outcome))
            })
            .collect();
        let mut completions = futures::stream::iter(tasks).buffer_unordered(self.max_concurrency);

        while let Some((index, outcome)) = completions.next().await {
            slots[index] = Some(outcome);
        }

        slots
            .into_iter()
            .map(|slot| slot.unwrap_or(TileOutcome::Ignored))
            .collect()
    }

    async fn process_tile(
        &self,
        index: usize,
        tile: &Tile,
        dashboard_filter: &ScopeFilter,
        ctx: &TileContext,
    ) -> TileOutcome {
        let tile_type = tile.kind.tile_type();
        let Some(processor) = self.processors.get(&tile_type) else {
            tracing::debug!(tile_index = index, tile = %tile.name, %tile_type, "Ignoring non-SLI tile");
            return TileOutcome::Ignored;
        };

        let scope = ScopeFilter::merge(dashboard_filter, &tile.filter);
        let result = match tokio::time::timeout(self.tile_timeout, processor.process(tile, scope, ctx)).await {
            Ok(result) => result,
            Err(_) => Err(TileError::Timeout(self.tile_timeout)),
        };

        match result {
            Ok(indicators) => {
                tracing::debug!(tile_index = index, tile = %tile.name, indicators = indicators.len(), "Processed tile");
                TileOutcome::Indicators(indicators)
            }
            Err(e) => {
                tracing::warn!(tile_index = index, tile = %tile.name, %tile_type, error = %e, "Skipping tile");
                TileOutcome::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::fake_backend::{status_error, FakeBackend};
    use crate::application::tile_processing::test_support::context;
    use crate::domain::dashboard::{MetricQuery, TileKind};
    use crate::domain::telemetry::MetricSeries;

    fn metric_tile(name: &str, selector: &str) -> Tile {
        Tile::new(
            name,
            TileKind::DataExplorer {
                queries: vec![MetricQuery {
                    metric_selector: selector.to_string(),
                    entity_selector: None,
                    enabled: true,
                }],
            },
        )
    }

    fn dashboard(tiles: Vec<Tile>) -> Dashboard {
        Dashboard {
            id: "dash".to_string(),
            name: "KQG;project=sockshop;service=carts;stage=staging".to_string(),
            filter: ScopeFilter::default(),
            tiles,
        }
    }

    fn names(outcome: &TileOutcome) -> Vec<String> {
        match outcome {
            TileOutcome::Indicators(results) => results.iter().map(|r| r.metric.clone()).collect(),
            _ => vec![],
        }
    }

    #[tokio::test]
    async fn test_failed_tile_is_isolated() {
        let backend = Arc::new(
            FakeBackend::default()
                .with_metric("m:a", vec![MetricSeries::new("m:a", vec![], Some(1.0))])
                .with_metric_error("m:b", status_error("/api/v2/metrics/query", 503))
                .with_metric("m:c", vec![MetricSeries::new("m:c", vec![], Some(3.0))]),
        );
        let dashboard = dashboard(vec![
            metric_tile("first;sli=first", "m:a"),
            metric_tile("second;sli=second", "m:b"),
            metric_tile("third;sli=third", "m:c"),
        ]);

        let outcomes = TileDispatcher::with_default_processors(4, Duration::from_secs(5))
            .dispatch(&dashboard, &context(backend))
            .await;

        assert_eq!(outcomes.len(), 3);
        assert_eq!(names(&outcomes[0]), vec!["first"]);
        assert!(matches!(&outcomes[1], TileOutcome::Failed(reason) if reason.contains("503")));
        assert_eq!(names(&outcomes[2]), vec!["third"]);
    }

    #[tokio::test]
    async fn test_order_is_kept_when_early_tiles_finish_last() {
        let backend = Arc::new(
            FakeBackend::default()
                .with_metric("m:slow", vec![MetricSeries::new("m:slow", vec![], Some(1.0))])
                .with_metric_delay("m:slow", Duration::from_millis(100))
                .with_metric("m:fast", vec![MetricSeries::new("m:fast", vec![], Some(2.0))]),
        );
        let dashboard = dashboard(vec![
            metric_tile("slow;sli=slow", "m:slow"),
            metric_tile("fast;sli=fast", "m:fast"),
        ]);

        let outcomes = TileDispatcher::with_default_processors(2, Duration::from_secs(5))
            .dispatch(&dashboard, &context(backend))
            .await;

        assert_eq!(names(&outcomes[0]), vec!["slow"]);
        assert_eq!(names(&outcomes[1]), vec!["fast"]);
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let selectors: Vec<String> = (0..6).map(|i| format!("m:{}", i)).collect();
        let mut backend = FakeBackend::default();
        for selector in &selectors {
            backend = backend
                .with_metric(selector, vec![MetricSeries::new(selector.as_str(), vec![], Some(1.0))])
                .with_metric_delay(selector, Duration::from_millis(30));
        }
        let backend = Arc::new(backend);
        let dashboard = dashboard(
            selectors
                .iter()
                .enumerate()
                .map(|(i, selector)| metric_tile(&format!("tile {};sli=t{}", i, i), selector))
                .collect(),
        );

        let outcomes = TileDispatcher::with_default_processors(2, Duration::from_secs(5))
            .dispatch(&dashboard, &context(backend.clone()))
            .await;

        assert_eq!(outcomes.len(), 6);
        assert!(outcomes.iter().all(|o| matches!(o, TileOutcome::Indicators(_))));
        assert_eq!(backend.peak_metrics_in_flight(), 2);
    }

    #[tokio::test]
    async fn test_slow_tile_times_out() {
        let backend = Arc::new(
            FakeBackend::default()
                .with_metric("m:slow", vec![MetricSeries::new("m:slow", vec![], Some(1.0))])
                .with_metric_delay("m:slow", Duration::from_secs(30)),
        );
        let dashboard = dashboard(vec![metric_tile("slow;sli=slow", "m:slow")]);

        let outcomes = TileDispatcher::with_default_processors(1, Duration::from_millis(20))
            .dispatch(&dashboard, &context(backend))
            .await;

        assert!(matches!(&outcomes[0], TileOutcome::Failed(reason) if reason.contains("exceeded")));
    }

    #[tokio::test]
    async fn test_non_sli_tiles_are_ignored() {
        let dashboard = dashboard(vec![
            Tile::new("Notes", TileKind::Markdown),
            Tile::new("Section", TileKind::Header),
            Tile::new("Query", TileKind::Unknown("USQL".to_string())),
        ]);

        let outcomes = TileDispatcher::with_default_processors(2, Duration::from_secs(1))
            .dispatch(&dashboard, &context(Arc::new(FakeBackend::default())))
            .await;

        assert_eq!(outcomes, vec![TileOutcome::Ignored; 3]);
    }

    #[tokio::test]
    async fn test_tile_filter_overrides_dashboard_filter() {
        let backend = Arc::new(FakeBackend::default());
        let mut dashboard = dashboard(vec![
            Tile::new("Problems", TileKind::OpenProblems),
            Tile::new("Security;sli=sec", TileKind::OpenSecurityProblems)
                .with_filter(ScopeFilter::with_zone("2", "checkout")),
        ]);
        dashboard.filter = ScopeFilter::with_zone("1", "sockshop");

        let outcomes = TileDispatcher::with_default_processors(1, Duration::from_secs(1))
            .dispatch(&dashboard, &context(backend))
            .await;

        let queries: Vec<String> = outcomes
            .iter()
            .filter_map(|o| match o {
                TileOutcome::Indicators(results) => Some(results[0].query.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(
            queries,
            vec![
                "PV2;problemSelector=status(OPEN),managementZoneIds(1)",
                "SECPV2;securityProblemSelector=status(OPEN),managementZoneIds(2)",
            ]
        );
    }
}
