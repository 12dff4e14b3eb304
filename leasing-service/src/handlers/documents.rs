use crate::dtos::{
    check_line_budget, AppendLineRequest, AppendLineResponse, DocumentResponse, EditLineRequest,
    RecalculateRequest, RemoveLineRequest, RemoveLineResponse, SeedUnitRequest, SeedUnitResponse,
};
use crate::models::TaxTable;
use crate::services::metrics::{record_error, record_operation, record_unit_seed};
use crate::services::RecalculationEngine;
use crate::startup::AppState;
use axum::{extract::State, Json};
use service_core::error::AppError;
use std::time::Instant;
use tracing::{info, instrument};
use validator::Validate;

fn validated<T: Validate>(request: &T) -> Result<(), AppError> {
    request.validate().map_err(|e| {
        record_error("validation");
        AppError::from(e)
    })
}

fn within_budget(state: &AppState, document: &crate::models::Document) -> Result<(), AppError> {
    check_line_budget(document, state.config.engine.max_lines_per_document).map_err(|e| {
        record_error("line_budget");
        e
    })
}

/// Full recompute of every line and the totals.
#[instrument(skip_all, fields(document_id = %request.document.document_id))]
pub async fn recalculate_document(
    State(state): State<AppState>,
    Json(mut request): Json<RecalculateRequest>,
) -> Result<Json<DocumentResponse>, AppError> {
    validated(&request)?;
    within_budget(&state, &request.document)?;

    let start = Instant::now();
    let taxes = TaxTable::new(request.tax_rates);
    let totals = RecalculationEngine::recalculate(&mut request.document, &taxes);
    record_operation(
        "recalculate",
        request.document.kind.as_str(),
        start.elapsed().as_secs_f64(),
    );

    info!(
        lines = request.document.line_count(),
        grand_total = %totals.grand_total,
        "Document recalculated"
    );

    Ok(Json(DocumentResponse {
        document: request.document,
    }))
}

/// Apply one field edit to one line.
#[instrument(
    skip_all,
    fields(
        document_id = %request.document.document_id,
        line_id = %request.line_id,
    )
)]
pub async fn edit_line(
    State(state): State<AppState>,
    Json(mut request): Json<EditLineRequest>,
) -> Result<Json<DocumentResponse>, AppError> {
    validated(&request)?;
    within_budget(&state, &request.document)?;

    let start = Instant::now();
    let taxes = TaxTable::new(request.tax_rates);
    RecalculationEngine::apply_edit(&mut request.document, request.line_id, request.edit, &taxes)
        .map_err(|e| {
            record_error("engine");
            AppError::from(e)
        })?;
    record_operation(
        "edit",
        request.document.kind.as_str(),
        start.elapsed().as_secs_f64(),
    );

    Ok(Json(DocumentResponse {
        document: request.document,
    }))
}

/// Append a default-initialised line.
#[instrument(
    skip_all,
    fields(
        document_id = %request.document.document_id,
        variant = request.variant.as_str(),
    )
)]
pub async fn append_line(
    State(state): State<AppState>,
    Json(mut request): Json<AppendLineRequest>,
) -> Result<Json<AppendLineResponse>, AppError> {
    validated(&request)?;
    // Room for the new line.
    check_line_budget(
        &request.document,
        state
            .config
            .engine
            .max_lines_per_document
            .saturating_sub(1),
    )
    .map_err(|e| {
        record_error("line_budget");
        e
    })?;

    let start = Instant::now();
    let taxes = TaxTable::new(request.tax_rates);
    let today = request
        .today
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let line_id =
        RecalculationEngine::append_line(&mut request.document, request.variant, today, &taxes);
    record_operation(
        "append",
        request.document.kind.as_str(),
        start.elapsed().as_secs_f64(),
    );

    Ok(Json(AppendLineResponse {
        line_id,
        document: request.document,
    }))
}

/// Remove a line and refresh the totals.
#[instrument(
    skip_all,
    fields(
        document_id = %request.document.document_id,
        line_id = %request.line_id,
    )
)]
pub async fn remove_line(
    State(state): State<AppState>,
    Json(mut request): Json<RemoveLineRequest>,
) -> Result<Json<RemoveLineResponse>, AppError> {
    validated(&request)?;
    within_budget(&state, &request.document)?;

    let start = Instant::now();
    let removed = RecalculationEngine::remove_line(&mut request.document, request.line_id);
    record_operation(
        "remove",
        request.document.kind.as_str(),
        start.elapsed().as_secs_f64(),
    );

    Ok(Json(RemoveLineResponse {
        removed,
        document: request.document,
    }))
}

/// Point a line at a unit and seed its rent from the unit catalog.
#[instrument(
    skip_all,
    fields(
        document_id = %request.document.document_id,
        line_id = %request.line_id,
        unit_id = %request.unit_id,
    )
)]
pub async fn seed_unit(
    State(state): State<AppState>,
    Json(mut request): Json<SeedUnitRequest>,
) -> Result<Json<SeedUnitResponse>, AppError> {
    validated(&request)?;
    within_budget(&state, &request.document)?;

    let start = Instant::now();
    let taxes = TaxTable::new(request.tax_rates);
    let outcome = RecalculationEngine::seed_unit(
        &mut request.document,
        request.line_id,
        &request.unit_id,
        state.units.as_ref(),
        &taxes,
    )
    .await
    .map_err(|e| {
        record_error("engine");
        AppError::from(e)
    })?;
    record_unit_seed(outcome.as_str());
    record_operation(
        "seed",
        request.document.kind.as_str(),
        start.elapsed().as_secs_f64(),
    );

    Ok(Json(SeedUnitResponse {
        outcome,
        document: request.document,
    }))
}
