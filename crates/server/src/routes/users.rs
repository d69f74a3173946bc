//! Member route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use loyalty_core::{ExternalId, UserId};

use crate::db::{RepositoryError, UserRepository};
use crate::error::{AppError, Result};
use crate::ledger::{LedgerError, RegisterUser, RegisteredUser};
use crate::middleware::RequireStaff;
use crate::models::{User, UserSummary};
use crate::state::AppState;

/// Editable member fields.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: String,
    pub phone: String,
}

/// Existence check response.
#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub exists: bool,
}

/// Parse a path segment into an external id.
pub(crate) fn parse_external_id(raw: &str) -> Result<ExternalId> {
    ExternalId::parse(raw).map_err(|e| AppError::BadRequest(e.to_string()))
}

/// Register a member.
///
/// POST /api/users/register
#[instrument(skip(state, request))]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterUser>,
) -> Result<(StatusCode, Json<RegisteredUser>)> {
    let user = state.ledger().register_user(request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Check whether a member is registered.
///
/// GET /api/users/check/{user_id}
#[instrument(skip(state))]
pub async fn check(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<CheckResponse>> {
    let external_id = parse_external_id(&user_id)?;
    UserRepository::new(state.pool())
        .get_by_external_id(&external_id)
        .await?
        .ok_or(LedgerError::UserNotFound)?;
    Ok(Json(CheckResponse { exists: true }))
}

/// Lifetime spending and current balance.
///
/// GET /api/user-info/{user_id}
#[instrument(skip(state))]
pub async fn info(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserSummary>> {
    let external_id = parse_external_id(&user_id)?;
    let users = UserRepository::new(state.pool());
    users
        .get_by_external_id(&external_id)
        .await?
        .ok_or(LedgerError::UserNotFound)?;
    Ok(Json(users.summary(&external_id).await?))
}

/// List all members.
///
/// GET /api/users
#[instrument(skip(state, _staff))]
pub async fn list(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
) -> Result<Json<Vec<User>>> {
    Ok(Json(UserRepository::new(state.pool()).list().await?))
}

/// Update a member's name and phone.
///
/// PUT /api/users/{id}
#[instrument(skip(state, staff, request), fields(staff = %staff.name))]
pub async fn update(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<i64>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<User>> {
    let name = request.name.trim();
    let phone = request.phone.trim();
    if name.is_empty() || phone.is_empty() {
        return Err(AppError::BadRequest("name and phone are required".to_string()));
    }

    let user = UserRepository::new(state.pool())
        .update(UserId::new(id), name, phone)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::from(LedgerError::UserNotFound),
            other => AppError::from(other),
        })?;
    Ok(Json(user))
}

/// Delete a member who has no ledger history.
///
/// DELETE /api/users/{id}
#[instrument(skip(state, staff), fields(staff = %staff.name))]
pub async fn delete(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    UserRepository::new(state.pool())
        .delete(UserId::new(id))
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::from(LedgerError::UserNotFound),
            RepositoryError::Conflict(_) => AppError::from(LedgerError::UserHasHistory),
            other => AppError::from(other),
        })?;

    tracing::info!(user_id = id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}
