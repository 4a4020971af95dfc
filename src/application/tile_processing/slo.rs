// SLO tiles: republish already evaluated SLOs
use super::{ensure_unique_indicators, TileContext, TileError, TileProcessor};
use crate::domain::criteria::{Criterion, Operator};
use crate::domain::dashboard::{SloSnapshot, Tile, TileKind};
use crate::domain::scope::ScopeFilter;
use crate::domain::sli::{clean_indicator_name, SloObjective, TileResult};
use async_trait::async_trait;

pub struct SloTileProcessor;

fn objective_for(snapshot: &SloSnapshot) -> Result<SloObjective, TileError> {
    let pass = vec![Criterion::new(Operator::GreaterOrEqual, snapshot.target.to_string())?];
    let warning = match snapshot.warning {
        Some(warning) => vec![Criterion::new(Operator::GreaterOrEqual, warning.to_string())?],
        None => vec![],
    };
    Ok(SloObjective {
        pass,
        warning,
        key: false,
    })
}

#[async_trait]
impl TileProcessor for SloTileProcessor {
    async fn process(
        &self,
        tile: &Tile,
        _scope: &ScopeFilter,
        ctx: &TileContext,
    ) -> Result<Vec<TileResult>, TileError> {
        let TileKind::Slo { slos } = &tile.kind else {
            return Err(TileError::NoData(format!("{} tile is not an SLO tile", tile.kind.tile_type())));
        };
        if slos.is_empty() {
            return Err(TileError::NoData("SLO tile has no assigned SLOs".to_string()));
        }

        let mut results = Vec::with_capacity(slos.len());
        for slo in slos {
            let snapshot = match &slo.snapshot {
                Some(snapshot) => snapshot.clone(),
                None => {
                    tracing::debug!(slo_id = %slo.id, "SLO tile carries no value, asking the backend");
                    ctx.backend.get_slo(&slo.id, &ctx.window).await?
                }
            };

            let name = format!("slo_{}", clean_indicator_name(&snapshot.name));
            let objective = objective_for(&snapshot)?;
            results.push(
                TileResult::measured(name, snapshot.evaluated_percentage, format!("SLO;{}", slo.id))
                    .with_objective(Some(objective)),
            );
        }

        ensure_unique_indicators(&results)?;
        Ok(results)
    }
}
