// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

use crate::application::dashboard_evaluator::DashboardEvaluator;
use crate::application::resource_chain::ResourceChain;
use crate::application::sli_service::SliService;
use crate::application::tile_dispatcher::TileDispatcher;
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::dynatrace_client::DynatraceClientFactory;
use crate::infrastructure::env_secrets::EnvSecretReader;
use crate::infrastructure::local_resources::LocalResourceSource;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{evaluate, health_check};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = load_app_config()?;

    // Adapters (infrastructure layer)
    let resources = ResourceChain::new(Arc::new(LocalResourceSource::new(&config.resources.directory)));
    let secrets = Arc::new(EnvSecretReader::from_env());
    let backends = Arc::new(DynatraceClientFactory::new(config.backend.request_timeout()));

    // Services (application layer)
    let dispatcher = TileDispatcher::with_default_processors(
        config.evaluation.max_concurrent_tiles,
        config.evaluation.tile_timeout(),
    );
    let sli_service = SliService::new(
        resources,
        secrets,
        config.credentials.default_secret.clone(),
        backends,
        DashboardEvaluator::new(dispatcher),
    );

    let state = Arc::new(AppState { sli_service });

    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/sli/evaluate", post(evaluate))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr: SocketAddr = config.server.address.parse()?;
    tracing::info!(%addr, "Starting dashboard-sli service");

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
