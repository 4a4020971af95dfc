// Dynatrace API payloads and their mapping to the domain model
use crate::application::pagination::QueryPage;
use crate::domain::dashboard::{
    ChartSeries, Dashboard, DashboardSummary, MetricQuery, SloReference, SloSnapshot, Tile, TileKind, TileType,
};
use crate::domain::scope::{ManagementZone, ScopeFilter};
use crate::domain::telemetry::{MetricSeries, ProblemRecord};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct DashboardListResponse {
    #[serde(default)]
    pub dashboards: Vec<DashboardEntry>,
}

#[derive(Debug, Deserialize)]
pub struct DashboardEntry {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub owner: String,
}

impl From<DashboardEntry> for DashboardSummary {
    fn from(entry: DashboardEntry) -> Self {
        Self {
            id: entry.id,
            name: entry.name,
            owner: entry.owner,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardDocument {
    pub id: String,
    pub dashboard_metadata: DashboardMetadata,
    #[serde(default)]
    pub tiles: Vec<TileDocument>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub dashboard_filter: Option<FilterDocument>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterDocument {
    #[serde(default)]
    pub management_zone: Option<ManagementZoneDocument>,
}

#[derive(Debug, Deserialize)]
pub struct ManagementZoneDocument {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileDocument {
    #[serde(default)]
    pub name: String,
    pub tile_type: String,
    #[serde(default)]
    pub tile_filter: Option<FilterDocument>,
    #[serde(default)]
    pub queries: Vec<QueryDocument>,
    #[serde(default)]
    pub filter_config: Option<FilterConfigDocument>,
    #[serde(default)]
    pub assigned_entities: Vec<String>,
    #[serde(default)]
    pub slo_snapshots: Vec<SloDocument>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryDocument {
    pub metric_selector: String,
    #[serde(default)]
    pub entity_selector: Option<String>,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterConfigDocument {
    #[serde(default)]
    pub custom_name: String,
    #[serde(default)]
    pub chart_config: Option<ChartConfigDocument>,
}

#[derive(Debug, Deserialize)]
pub struct ChartConfigDocument {
    #[serde(default)]
    pub series: Vec<ChartSeriesDocument>,
}

#[derive(Debug, Deserialize)]
pub struct ChartSeriesDocument {
    pub metric: String,
    #[serde(default)]
    pub aggregation: String,
}

/// `/api/v2/slo/{id}` body; also embedded in SLO tiles as a snapshot.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SloDocument {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub evaluated_percentage: f64,
    pub target: f64,
    #[serde(default)]
    pub warning: Option<f64>,
}

impl From<SloDocument> for SloSnapshot {
    fn from(slo: SloDocument) -> Self {
        Self {
            name: slo.name,
            evaluated_percentage: slo.evaluated_percentage,
            target: slo.target,
            warning: slo.warning,
        }
    }
}

impl From<FilterDocument> for ScopeFilter {
    fn from(filter: FilterDocument) -> Self {
        Self {
            management_zone: filter.management_zone.map(|zone| ManagementZone {
                id: zone.id,
                name: zone.name,
            }),
        }
    }
}

impl TileDocument {
    fn into_kind(self) -> TileKind {
        match TileType::from_wire(&self.tile_type) {
            TileType::OpenProblems => TileKind::OpenProblems,
            TileType::OpenSecurityProblems => TileKind::OpenSecurityProblems,
            TileType::DataExplorer => TileKind::DataExplorer {
                queries: self
                    .queries
                    .into_iter()
                    .map(|q| MetricQuery {
                        metric_selector: q.metric_selector,
                        entity_selector: q.entity_selector.filter(|s| !s.trim().is_empty()),
                        enabled: q.enabled,
                    })
                    .collect(),
            },
            TileType::CustomCharting => {
                let filter_config = self.filter_config.unwrap_or(FilterConfigDocument {
                    custom_name: String::new(),
                    chart_config: None,
                });
                TileKind::CustomCharting {
                    custom_name: filter_config.custom_name,
                    series: filter_config
                        .chart_config
                        .map(|c| c.series)
                        .unwrap_or_default()
                        .into_iter()
                        .map(|s| ChartSeries {
                            metric: s.metric,
                            aggregation: s.aggregation,
                        })
                        .collect(),
                }
            }
            TileType::Slo => {
                let mut snapshots = self.slo_snapshots;
                TileKind::Slo {
                    slos: self
                        .assigned_entities
                        .into_iter()
                        .map(|id| {
                            let snapshot = snapshots
                                .iter()
                                .position(|s| s.id == id)
                                .map(|i| snapshots.swap_remove(i).into());
                            SloReference { id, snapshot }
                        })
                        .collect(),
                }
            }
            TileType::Markdown => TileKind::Markdown,
            TileType::Header => TileKind::Header,
            TileType::Unknown => TileKind::Unknown(self.tile_type),
        }
    }
}

impl From<DashboardDocument> for Dashboard {
    fn from(document: DashboardDocument) -> Self {
        Self {
            id: document.id,
            name: document.dashboard_metadata.name,
            filter: document
                .dashboard_metadata
                .dashboard_filter
                .map(ScopeFilter::from)
                .unwrap_or_default(),
            tiles: document
                .tiles
                .into_iter()
                .map(|mut tile| {
                    let filter = tile.tile_filter.take().map(ScopeFilter::from).unwrap_or_default();
                    Tile::new(tile.name.clone(), tile.into_kind()).with_filter(filter)
                })
                .collect(),
        }
    }
}

/// Problems and security problems share the page layout.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemsPage {
    pub total_count: u64,
    #[serde(default)]
    pub page_size: u64,
    #[serde(default)]
    pub next_page_key: Option<String>,
    #[serde(default, alias = "securityProblems")]
    pub problems: Vec<ProblemDocument>,
}

#[derive(Debug, Deserialize)]
pub struct ProblemDocument {
    #[serde(default, alias = "problemId", alias = "securityProblemId")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status: String,
}

impl From<ProblemsPage> for QueryPage<ProblemRecord> {
    fn from(page: ProblemsPage) -> Self {
        Self {
            total_count: page.total_count,
            page_size: page.page_size,
            next_page_key: page.next_page_key,
            items: page
                .problems
                .into_iter()
                .map(|p| ProblemRecord {
                    id: p.id,
                    title: p.title,
                    status: p.status,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MetricsResponse {
    #[serde(default)]
    pub result: Vec<MetricResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricResult {
    pub metric_id: String,
    #[serde(default)]
    pub data: Vec<MetricData>,
}

#[derive(Debug, Deserialize)]
pub struct MetricData {
    #[serde(default)]
    pub dimensions: Vec<String>,
    #[serde(default)]
    pub values: Vec<Option<f64>>,
}

impl MetricsResponse {
    /// With resolution=Inf every series carries at most one value.
    pub fn into_series(self) -> Vec<MetricSeries> {
        self.result
            .into_iter()
            .flat_map(|result| {
                let metric_id = result.metric_id;
                result.data.into_iter().map(move |data| {
                    let value = data.values.iter().rev().find_map(|v| *v);
                    MetricSeries::new(metric_id.clone(), data.dimensions, value)
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DASHBOARD: &str = r##"{
        "id": "12345678-1111-4444-8888-123456789012",
        "dashboardMetadata": {
            "name": "KQG;project=sockshop;service=carts;stage=staging",
            "owner": "someone",
            "dashboardFilter": { "managementZone": { "id": "-1", "name": "sockshop" } }
        },
        "tiles": [
            { "name": "Markdown", "tileType": "MARKDOWN", "markdown": "# Quality gate" },
            { "name": "Problems", "tileType": "OPEN_PROBLEMS",
              "tileFilter": { "managementZone": { "id": "2", "name": "carts" } } },
            { "name": "Response time;sli=rt;pass=<=500", "tileType": "DATA_EXPLORER",
              "queries": [
                { "metricSelector": "builtin:service.response.time:avg", "entitySelector": "", "enabled": true },
                { "metricSelector": "builtin:service.errors.total.rate:avg", "enabled": false }
              ] },
            { "name": "Custom chart", "tileType": "CUSTOM_CHARTING",
              "filterConfig": { "customName": "Failure rate;sli=fr",
                "chartConfig": { "series": [ { "metric": "builtin:service.errors.total.rate", "aggregation": "AVG" } ] } } },
            { "name": "Availability", "tileType": "SLO",
              "assignedEntities": ["slo-a", "slo-b"],
              "sloSnapshots": [ { "id": "slo-b", "name": "B", "evaluatedPercentage": 97.0, "target": 95.0 } ] },
            { "name": "User sessions", "tileType": "USQL" }
        ]
    }"##;

    #[test]
    fn test_dashboard_document_maps_to_domain() {
        let document: DashboardDocument = serde_json::from_str(DASHBOARD).unwrap();
        let dashboard = Dashboard::from(document);

        assert_eq!(dashboard.filter, ScopeFilter::with_zone("-1", "sockshop"));
        assert_eq!(dashboard.tiles.len(), 6);
        assert_eq!(dashboard.tiles[0].kind, TileKind::Markdown);
        assert_eq!(dashboard.tiles[1].filter, ScopeFilter::with_zone("2", "carts"));

        match &dashboard.tiles[2].kind {
            TileKind::DataExplorer { queries } => {
                assert_eq!(queries.len(), 2);
                assert_eq!(queries[0].entity_selector, None);
                assert!(!queries[1].enabled);
            }
            other => panic!("unexpected kind {:?}", other),
        }
        match &dashboard.tiles[3].kind {
            TileKind::CustomCharting { custom_name, series } => {
                assert_eq!(custom_name, "Failure rate;sli=fr");
                assert_eq!(series[0].metric_selector(), "builtin:service.errors.total.rate:avg");
            }
            other => panic!("unexpected kind {:?}", other),
        }
        match &dashboard.tiles[4].kind {
            TileKind::Slo { slos } => {
                assert_eq!(slos[0].snapshot, None);
                assert_eq!(slos[1].snapshot.as_ref().map(|s| s.evaluated_percentage), Some(97.0));
            }
            other => panic!("unexpected kind {:?}", other),
        }
        assert_eq!(dashboard.tiles[5].kind, TileKind::Unknown("USQL".to_string()));
    }

    #[test]
    fn test_security_problems_page() {
        let body = r#"{ "totalCount": 3, "pageSize": 2, "nextPageKey": "AQAAABQBAAAABQ==",
            "securityProblems": [ { "securityProblemId": "1", "title": "Log4Shell", "status": "OPEN" },
                                  { "securityProblemId": "2", "title": "Spring4Shell", "status": "OPEN" } ] }"#;

        let page: QueryPage<ProblemRecord> = serde_json::from_str::<ProblemsPage>(body).unwrap().into();

        assert_eq!(page.total_count, 3);
        assert_eq!(page.next_page_key.as_deref(), Some("AQAAABQBAAAABQ=="));
        assert_eq!(page.items[1].title, "Spring4Shell");
    }

    #[test]
    fn test_metrics_response_to_series() {
        let body = r#"{ "totalCount": 2, "resolution": "Inf", "result": [ { "metricId": "builtin:service.response.time:avg",
            "data": [ { "dimensions": ["SERVICE-1"], "timestamps": [1], "values": [412.5] },
                      { "dimensions": ["SERVICE-2"], "timestamps": [1], "values": [null] } ] } ] }"#;

        let series = serde_json::from_str::<MetricsResponse>(body).unwrap().into_series();

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].value, Some(412.5));
        assert_eq!(series[1].dimensions, vec!["SERVICE-2"]);
        assert_eq!(series[1].value, None);
    }
}
