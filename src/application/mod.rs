// Application layer - Use cases and ports
pub mod credentials;
pub mod dashboard_evaluator;
pub mod dashboard_locator;
pub mod monitoring_backend;
pub mod pagination;
pub mod resource_chain;
pub mod sli_service;
pub mod tile_dispatcher;
pub mod tile_processing;

#[cfg(test)]
pub mod fake_backend;
