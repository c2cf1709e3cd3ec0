//! Router creation and configuration

use super::handlers::*;
use super::types::AppState;
use crate::config::ServerConfig;
use axum::{
    routing::{get, post},
    Router,
};
use runform_sdk::InputSetResolver;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create REST API router
pub fn create_router(resolver: InputSetResolver, config: ServerConfig) -> Router {
    let state = AppState {
        resolver: Arc::new(RwLock::new(resolver)),
        config: Arc::new(config),
    };

    Router::new()
        .route("/health", get(health))
        .route(
            "/v1/pipelines/:pipeline_identifier/run-inputs",
            post(run_inputs),
        )
        .route("/v1/repo/reload", post(reload_repository))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
