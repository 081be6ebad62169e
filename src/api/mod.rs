mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use rmcp::transport::streamable_http_server::{
    session::local::LocalSessionManager, StreamableHttpServerConfig, StreamableHttpService,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::chart::ChartProvider;
use crate::mcp::McpServer;

/// Shared, read-only state for request handlers.
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn ChartProvider>,
}

impl AppState {
    pub fn new(provider: Arc<dyn ChartProvider>) -> Self {
        Self { provider }
    }
}

pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        // Combined charts
        .route("/svg_combined_chart", post(handlers::svg_combined_chart))
        .route(
            "/svg_combined_chart_base64",
            post(handlers::svg_combined_chart_base64),
        )
        // Health
        .route("/health", get(handlers::health));

    let provider = state.provider.clone();
    let mcp = StreamableHttpService::new(
        move || Ok(McpServer::new(provider.clone())),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig::default(),
    );

    Router::new()
        .nest("/api/v1", api)
        .nest_service("/mcp", mcp)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
