use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
    http::StatusCode,
};
use std::sync::Arc;
use tracing::{info, warn, error};

use crate::inventory::{InventoryError, ModelIndex, ScanSummary};
use super::server::AppState;
use super::types::ApiResponse;

/// Returns a health check response
pub async fn health_check() -> &'static str {
    info!("Health check endpoint called");
    "ipheno is running!"
}

/// Returns the stored model index.
///
/// A missing index answers 503 and an unparseable one 500, both in the
/// error envelope.
pub async fn get_index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    info!("Model index endpoint called");

    match state.builder.store().load() {
        Ok(index) => (StatusCode::OK, Json(ApiResponse::success(index))),
        Err(e) => {
            let status = match &e {
                InventoryError::IndexUnreadable { .. } => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            error!("Failed to read model index: {}", e);
            (status, Json(ApiResponse::<ModelIndex>::error(e.to_string())))
        }
    }
}

/// Rebuilds the model index now and returns a summary of the scan.
pub async fn check_models(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    info!("Check models endpoint called");

    match state.builder.scan(&state.models_dir).await {
        Ok(summary) => (StatusCode::OK, Json(ApiResponse::success(summary))),
        Err(e) => {
            error!("Model scan failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<ScanSummary>::error(e.to_string())),
            )
        }
    }
}

/// Probes every executable and returns `{"status": "good"}` or the list of
/// invalid executables.
pub async fn validate_models(State(state): State<Arc<AppState>>) -> Response {
    info!("Validate models endpoint called");

    match state.builder.validate_executables(&state.models_dir).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => {
            error!("Model validation failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error(e.to_string())),
            )
                .into_response()
        }
    }
}

/// Lists the operation ids the UI may enable: every tiered model plus the
/// configured non-model operations.
pub async fn list_operations(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    info!("Operations endpoint called");

    let index = match state.builder.store().load() {
        Ok(index) => index,
        Err(e) => {
            warn!("Model index unavailable, listing configured operations only: {}", e);
            ModelIndex::default()
        }
    };
    let ids: Vec<String> = index.known_ids(&state.known_operations).into_iter().collect();
    Json(ApiResponse::success(ids))
}
