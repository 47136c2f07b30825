use std::error::Error;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use axum::{Router, routing::{get, post}};
use tracing::{info, warn};

use crate::inventory::InventoryBuilder;
use super::routes;

/// State shared by all request handlers
pub struct AppState {
    pub builder: InventoryBuilder,
    /// Directory scanned for model executables
    pub models_dir: PathBuf,
    /// Operation ids that are valid without an executable
    pub known_operations: Vec<String>,
}

/// Builds the router for the query interface.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::health_check))
        .route("/api/v1/models", get(routes::get_index))
        .route("/api/v1/models/check", post(routes::check_models))
        .route("/api/v1/models/validate", get(routes::validate_models))
        .route("/api/v1/operations", get(routes::list_operations))
        .with_state(state)
}

/// API Server answering model inventory requests
pub struct ApiServer {
    state: Arc<AppState>,
    host: String,
    port: u16,
}

impl ApiServer {
    pub fn new(state: AppState, host: String, port: u16) -> Self {
        info!("Creating new API server on {}:{}", host, port);
        Self {
            state: Arc::new(state),
            host,
            port,
        }
    }

    /// Builds the model index so it is ready before the first request.
    pub async fn initialize(&self) {
        info!("Initializing model index...");
        match self.state.builder.scan(&self.state.models_dir).await {
            Ok(summary) => info!(
                "Model index initialized: {} root, {} leaves, {} described",
                summary.root, summary.leaves, summary.described
            ),
            Err(e) => warn!("Failed to initialize model index: {}", e),
        }
    }

    /// Serves requests until `shutdown` resolves.
    pub async fn start<F>(&self, shutdown: F) -> Result<(), Box<dyn Error + Send + Sync>>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = router(Arc::clone(&self.state));

        info!("Starting server on {}:{}", self.host, self.port);
        let listener = TcpListener::bind((self.host.as_str(), self.port)).await?;

        info!("Server started successfully");
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;
        info!("Server stopped");
        Ok(())
    }

    /// Removes the index artifact; called on shutdown.
    pub fn cleanup(&self) {
        if let Err(e) = self.state.builder.store().remove() {
            warn!("Failed to remove model index: {}", e);
        }
    }
}
