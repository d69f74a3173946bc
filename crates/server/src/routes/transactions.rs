//! Ledger route handlers: spending and listings.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use crate::db::TransactionRepository;
use crate::error::Result;
use crate::ledger::{NewSpending, SpendingReceipt};
use crate::middleware::RequireStaff;
use crate::models::Transaction;
use crate::routes::users::parse_external_id;
use crate::state::AppState;

/// Record a purchase and award points.
///
/// POST /api/transactions
#[instrument(skip(state, request))]
pub async fn record_spending(
    State(state): State<AppState>,
    Json(request): Json<NewSpending>,
) -> Result<(StatusCode, Json<SpendingReceipt>)> {
    let receipt = state.ledger().record_spending(request).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

/// Full ledger, newest first.
///
/// GET /api/transactions
#[instrument(skip(state, _staff))]
pub async fn list(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
) -> Result<Json<Vec<Transaction>>> {
    Ok(Json(TransactionRepository::new(state.pool()).list().await?))
}

/// Ledger of one member, newest first.
///
/// GET /api/user-transactions/{user_id}
#[instrument(skip(state))]
pub async fn list_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Transaction>>> {
    let external_id = parse_external_id(&user_id)?;
    let entries = TransactionRepository::new(state.pool())
        .list_for_user(&external_id)
        .await?;
    Ok(Json(entries))
}
