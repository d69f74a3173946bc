//! Promotion route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use loyalty_core::PromotionId;

use crate::db::{PromotionRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::ledger::LedgerError;
use crate::middleware::RequireStaff;
use crate::models::{Promotion, PromotionInput};
use crate::state::AppState;

fn not_found_as_promotion(err: RepositoryError) -> AppError {
    match err {
        RepositoryError::NotFound => AppError::from(LedgerError::PromotionNotFound),
        RepositoryError::Conflict(_) => AppError::from(LedgerError::PromotionInUse),
        other => AppError::from(other),
    }
}

/// List promotions.
///
/// GET /api/promotions
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Promotion>>> {
    Ok(Json(PromotionRepository::new(state.pool()).list().await?))
}

/// Promotion detail.
///
/// GET /api/promotions/{id}
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Promotion>> {
    let promotion = PromotionRepository::new(state.pool())
        .get(PromotionId::new(id))
        .await?
        .ok_or(LedgerError::PromotionNotFound)?;
    Ok(Json(promotion))
}

/// Create a promotion.
///
/// POST /api/promotions
#[instrument(skip(state, staff, input), fields(staff = %staff.name))]
pub async fn create(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Json(input): Json<PromotionInput>,
) -> Result<(StatusCode, Json<Promotion>)> {
    let input = input.validate().map_err(AppError::BadRequest)?;
    let promotion = PromotionRepository::new(state.pool()).create(&input).await?;

    tracing::info!(promotion_id = %promotion.id, "Promotion created");
    Ok((StatusCode::CREATED, Json(promotion)))
}

/// Replace a promotion's fields.
///
/// PUT /api/promotions/{id}
#[instrument(skip(state, staff, input), fields(staff = %staff.name))]
pub async fn update(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<i64>,
    Json(input): Json<PromotionInput>,
) -> Result<Json<Promotion>> {
    let input = input.validate().map_err(AppError::BadRequest)?;
    let promotion = PromotionRepository::new(state.pool())
        .update(PromotionId::new(id), &input)
        .await
        .map_err(not_found_as_promotion)?;
    Ok(Json(promotion))
}

/// Delete a promotion that no redemption references.
///
/// DELETE /api/promotions/{id}
#[instrument(skip(state, staff), fields(staff = %staff.name))]
pub async fn delete(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    PromotionRepository::new(state.pool())
        .delete(PromotionId::new(id))
        .await
        .map_err(not_found_as_promotion)?;

    tracing::info!(promotion_id = id, "Promotion deleted");
    Ok(StatusCode::NO_CONTENT)
}
