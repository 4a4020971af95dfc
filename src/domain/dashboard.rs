// Dashboard domain model
use super::scope::ScopeFilter;
use std::fmt;

/// One entry of the dashboard listing, enough to run name matching.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
    pub id: String,
    pub name: String,
    pub owner: String,
}

/// A fetched dashboard. Treated as an immutable snapshot for one evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub id: String,
    pub name: String,
    pub filter: ScopeFilter,
    pub tiles: Vec<Tile>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub name: String,
    pub filter: ScopeFilter,
    pub kind: TileKind,
}

impl Tile {
    pub fn new(name: impl Into<String>, kind: TileKind) -> Self {
        Self {
            name: name.into(),
            filter: ScopeFilter::default(),
            kind,
        }
    }

    pub fn with_filter(mut self, filter: ScopeFilter) -> Self {
        self.filter = filter;
        self
    }
}

/// Tag used to look up a tile processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileType {
    OpenProblems,
    OpenSecurityProblems,
    DataExplorer,
    CustomCharting,
    Slo,
    Markdown,
    Header,
    Unknown,
}

impl TileType {
    pub fn from_wire(tag: &str) -> Self {
        match tag {
            "OPEN_PROBLEMS" => TileType::OpenProblems,
            "OPEN_SECURITY_PROBLEMS" => TileType::OpenSecurityProblems,
            "DATA_EXPLORER" => TileType::DataExplorer,
            "CUSTOM_CHARTING" => TileType::CustomCharting,
            "SLO" => TileType::Slo,
            "MARKDOWN" => TileType::Markdown,
            "HEADER" => TileType::Header,
            _ => TileType::Unknown,
        }
    }
}

impl fmt::Display for TileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            TileType::OpenProblems => "OPEN_PROBLEMS",
            TileType::OpenSecurityProblems => "OPEN_SECURITY_PROBLEMS",
            TileType::DataExplorer => "DATA_EXPLORER",
            TileType::CustomCharting => "CUSTOM_CHARTING",
            TileType::Slo => "SLO",
            TileType::Markdown => "MARKDOWN",
            TileType::Header => "HEADER",
            TileType::Unknown => "UNKNOWN",
        };
        f.write_str(tag)
    }
}

/// Tile payload per type. Only the parts a processor needs are kept.
#[derive(Debug, Clone, PartialEq)]
pub enum TileKind {
    OpenProblems,
    OpenSecurityProblems,
    DataExplorer { queries: Vec<MetricQuery> },
    CustomCharting { custom_name: String, series: Vec<ChartSeries> },
    Slo { slos: Vec<SloReference> },
    Markdown,
    Header,
    Unknown(String),
}

impl TileKind {
    pub fn tile_type(&self) -> TileType {
        match self {
            TileKind::OpenProblems => TileType::OpenProblems,
            TileKind::OpenSecurityProblems => TileType::OpenSecurityProblems,
            TileKind::DataExplorer { .. } => TileType::DataExplorer,
            TileKind::CustomCharting { .. } => TileType::CustomCharting,
            TileKind::Slo { .. } => TileType::Slo,
            TileKind::Markdown => TileType::Markdown,
            TileKind::Header => TileType::Header,
            TileKind::Unknown(_) => TileType::Unknown,
        }
    }
}

/// A data explorer query as stored on the tile.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricQuery {
    pub metric_selector: String,
    pub entity_selector: Option<String>,
    pub enabled: bool,
}

/// A custom chart series; rendered as `<metric>:<aggregation>`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub metric: String,
    pub aggregation: String,
}

impl ChartSeries {
    pub fn metric_selector(&self) -> String {
        if self.aggregation.is_empty() {
            self.metric.clone()
        } else {
            format!("{}:{}", self.metric, self.aggregation.to_lowercase())
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SloReference {
    pub id: String,
    pub snapshot: Option<SloSnapshot>,
}

/// An already-evaluated SLO.
#[derive(Debug, Clone, PartialEq)]
pub struct SloSnapshot {
    pub name: String,
    pub evaluated_percentage: f64,
    pub target: f64,
    pub warning: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_type_round_trips_wire_tag() {
        for tag in ["OPEN_PROBLEMS", "OPEN_SECURITY_PROBLEMS", "DATA_EXPLORER", "CUSTOM_CHARTING", "SLO", "MARKDOWN", "HEADER"] {
            assert_eq!(TileType::from_wire(tag).to_string(), tag);
        }
        assert_eq!(TileType::from_wire("USQL"), TileType::Unknown);
    }

    #[test]
    fn test_chart_series_selector() {
        let series = ChartSeries {
            metric: "builtin:service.response.time".to_string(),
            aggregation: "AVG".to_string(),
        };
        assert_eq!(series.metric_selector(), "builtin:service.response.time:avg");
    }
}
