use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// Liveness check.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": state.config.service_name,
        "version": state.config.service_version
    }))
}

/// Readiness check: ready once the unit catalog (if configured) is loaded.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    if state.units_ready {
        tracing::debug!("Readiness check passed");
        StatusCode::OK
    } else {
        tracing::warn!("Readiness check failed - unit catalog not loaded");
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// Metrics endpoint for Prometheus scraping.
pub async fn metrics_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        crate::services::get_metrics(),
    )
}
