// Open problems and open security problems tiles
use super::{threshold_from_name, TileContext, TileError, TileProcessor};
use crate::application::pagination::{fetch_all_pages, PageQuery};
use crate::domain::criteria::ThresholdSpec;
use crate::domain::dashboard::Tile;
use crate::domain::scope::ScopeFilter;
use crate::domain::sli::TileResult;
use crate::domain::telemetry::ProblemCategory;
use async_trait::async_trait;

/// Counts open problems of one category. Without a threshold spec in the tile
/// name the indicator must stay at zero and is a key indicator.
pub struct ProblemTileProcessor {
    category: ProblemCategory,
}

impl ProblemTileProcessor {
    pub fn new(category: ProblemCategory) -> Self {
        Self { category }
    }

    fn default_threshold(&self) -> Result<ThresholdSpec, TileError> {
        let spec = format!("sli={};pass=<=0;key=true", self.category.default_indicator());
        Ok(ThresholdSpec::parse(&spec)?)
    }
}

#[async_trait]
impl TileProcessor for ProblemTileProcessor {
    async fn process(
        &self,
        tile: &Tile,
        scope: &ScopeFilter,
        ctx: &TileContext,
    ) -> Result<Vec<TileResult>, TileError> {
        let selector = format!("status(OPEN){}", scope.problem_selector_suffix()?);
        let query = PageQuery {
            selector: selector.clone(),
            window: ctx.window,
            fields: vec![],
        };

        let backend = ctx.backend.as_ref();
        let category = self.category;
        let problems = fetch_all_pages(query, |request| async move {
            backend.list_problems_page(category, &request).await
        })
        .await?;

        // name-embedded thresholds take precedence over the default
        let threshold = match threshold_from_name(&tile.name)? {
            Some(spec) => spec,
            None => self.default_threshold()?,
        };

        let value = problems.len() as f64;
        let sli_query = format!(
            "{};{}={}",
            category.query_prefix(),
            category.selector_param(),
            selector
        );

        tracing::debug!(indicator = %threshold.name, value, "Counted open problems");

        Ok(vec![
            TileResult::measured(threshold.name.clone(), value, sli_query).with_objective(Some(threshold.into())),
        ])
    }
}
