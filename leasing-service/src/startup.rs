//! Application startup and lifecycle management.

use crate::config::LeasingConfig;
use crate::handlers::{
    append_line, edit_line, get_unit, health_check, metrics_handler, readiness_check,
    recalculate_document, remove_line, seed_unit,
};
use crate::middleware::http_metrics_middleware;
use crate::services::{init_metrics, UnitCatalog, UnitResolver};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::request_id_middleware;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: LeasingConfig,
    pub units: Arc<dyn UnitResolver>,
    /// False when a configured unit catalog failed to load.
    pub units_ready: bool,
}

/// HTTP routes of the service.
pub fn build_router(state: AppState) -> Router {
    let documents = Router::new()
        .route("/recalculate", post(recalculate_document))
        .route("/edit", post(edit_line))
        .route("/lines", post(append_line))
        .route("/lines/remove", post(remove_line))
        .route("/seed-unit", post(seed_unit));

    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics_handler))
        .nest("/v1/documents", documents)
        .route("/v1/units/:unit_id", get(get_unit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(http_metrics_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: LeasingConfig) -> Result<Self, AppError> {
        init_metrics();

        // A broken catalog leaves the engine usable; seeding then reports
        // unknown units and readiness fails until restart.
        let (catalog, units_ready) = match &config.engine.unit_catalog_path {
            Some(path) => match UnitCatalog::from_json_file(path).await {
                Ok(catalog) => (catalog, true),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to load unit catalog");
                    (UnitCatalog::default(), false)
                }
            },
            None => {
                tracing::warn!("UNIT_CATALOG_PATH not set, unit seeding disabled");
                (UnitCatalog::default(), true)
            }
        };

        let state = AppState {
            config: config.clone(),
            units: Arc::new(catalog),
            units_ready,
        };

        let addr = config.common.socket_addr();
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!(error = %e, addr = %addr, "Failed to bind HTTP listener");
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(port = port, "Leasing service listener bound");

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state.clone());

        tracing::info!(
            service = %self.state.config.service_name,
            version = %self.state.config.service_version,
            port = self.port,
            "Service ready to accept connections"
        );

        axum::serve(self.listener, router).await.map_err(|e| {
            tracing::error!(error = %e, "HTTP server error");
            std::io::Error::other(format!("HTTP server error: {}", e))
        })
    }
}
