use crate::models::UnitDefaults;
use crate::startup::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use service_core::error::AppError;
use tracing::instrument;

/// Look up the default rent terms of a unit.
#[instrument(skip(state))]
pub async fn get_unit(
    State(state): State<AppState>,
    Path(unit_id): Path<String>,
) -> Result<Json<UnitDefaults>, AppError> {
    state
        .units
        .resolve(&unit_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Unit {} not found", unit_id)))
}
