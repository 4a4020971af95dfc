// Domain layer - Dashboards, thresholds and SLI results
pub mod criteria;
pub mod dashboard;
pub mod evaluation;
pub mod scope;
pub mod sli;
pub mod telemetry;
