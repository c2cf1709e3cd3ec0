//! API endpoint handlers

use super::conversions::{to_response, to_run_input_request};
use super::extractors::JsonExtractor;
use super::types::*;
use crate::error::ServerError;
use crate::resolver::init_resolver;
use axum::{
    extract::{Path, State},
    Json,
};
use tracing::{error, info};

/// Health check endpoint
pub(super) async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Resolve the run form of a pipeline
pub(super) async fn run_inputs(
    State(state): State<AppState>,
    Path(pipeline_identifier): Path<String>,
    JsonExtractor(payload): JsonExtractor<RunInputsPayload>,
) -> Result<Json<RunInputsResponse>, ServerError> {
    let default_scope = state.config.backend.scope().unwrap_or_default();
    let request = to_run_input_request(&pipeline_identifier, payload, default_scope)?;

    info!(
        "Resolving run inputs for {} with {} input set(s), rerun={}",
        pipeline_identifier,
        request.input_set_refs.len(),
        request.rerun().is_some()
    );

    // Read lock only; resolution does not touch the resolver session
    let resolver = state.resolver.read().await;
    let resolved = resolver.resolve(&request).await?;
    drop(resolver);

    Ok(Json(to_response(&pipeline_identifier, resolved)?))
}

/// Rebuild the resolver from the configured backend
pub(super) async fn reload_repository(
    State(state): State<AppState>,
) -> Result<Json<ReloadResponse>, ServerError> {
    info!("Reloading pipeline repository");

    match init_resolver(&state.config).await {
        Ok(resolver) => {
            *state.resolver.write().await = resolver;
            info!("Pipeline repository reloaded");
            Ok(Json(ReloadResponse {
                success: true,
                message: "Repository reloaded".to_string(),
            }))
        }
        Err(e) => {
            error!("Failed to reload repository: {}", e);
            Err(ServerError::InternalError(format!(
                "Failed to reload repository: {}",
                e
            )))
        }
    }
}
