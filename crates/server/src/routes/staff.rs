//! Staff account and session route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use loyalty_core::StaffId;

use crate::db::StaffRepository;
use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireAdmin, RequireStaff, clear_current_staff, set_current_staff};
use crate::models::{CurrentStaff, Staff, StaffUpdate};
use crate::services::{StaffAuthService, StaffRegistration};
use crate::state::AppState;

/// Login request.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub name: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("name", &self.name)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Log a staff member in and start a session.
///
/// POST /api/staff/login
#[instrument(skip(state, session, request), fields(name = %request.name))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<LoginRequest>,
) -> Result<Json<CurrentStaff>> {
    let staff = StaffAuthService::new(state.pool())
        .login(&request.name, &request.password)
        .await?;

    let current = CurrentStaff::from(&staff);
    set_current_staff(&session, &current).await?;
    set_sentry_user(&current.id, &current.name);

    tracing::info!(staff_id = %current.id, "Staff logged in");
    Ok(Json(current))
}

/// End the current session.
///
/// POST /api/staff/logout
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_staff(&session).await?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}

/// The logged-in staff member.
///
/// GET /api/staff/me
pub async fn me(RequireStaff(staff): RequireStaff) -> Json<CurrentStaff> {
    Json(staff)
}

/// List staff accounts.
///
/// GET /api/staff
#[instrument(skip(state, _staff))]
pub async fn list(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
) -> Result<Json<Vec<Staff>>> {
    Ok(Json(StaffRepository::new(state.pool()).list().await?))
}

/// Create a staff account.
///
/// POST /api/staff/register
#[instrument(skip(state, admin, registration), fields(admin = %admin.name))]
pub async fn register(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(registration): Json<StaffRegistration>,
) -> Result<(StatusCode, Json<Staff>)> {
    let staff = StaffAuthService::new(state.pool())
        .register(registration)
        .await?;
    Ok((StatusCode::CREATED, Json(staff)))
}

/// Update a staff account.
///
/// PUT /api/staff/{id}
#[instrument(skip(state, admin, update), fields(admin = %admin.name))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i64>,
    Json(update): Json<StaffUpdate>,
) -> Result<Json<Staff>> {
    let staff = StaffAuthService::new(state.pool())
        .update(StaffId::new(id), update)
        .await?;
    Ok(Json(staff))
}

/// Delete a staff account.
///
/// DELETE /api/staff/{id}
#[instrument(skip(state, admin), fields(admin = %admin.name))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    StaffAuthService::new(state.pool())
        .delete(StaffId::new(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
