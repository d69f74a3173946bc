//! Redemption and coupon route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use loyalty_core::{CouponStatus, CouponToken};

use crate::db::TransactionRepository;
use crate::error::{AppError, Result};
use crate::ledger::{LedgerError, Redemption, RedemptionRequest};
use crate::middleware::RequireStaff;
use crate::models::{CouponDetails, UserCoupon};
use crate::routes::users::parse_external_id;
use crate::state::AppState;

/// Coupon use request.
#[derive(Debug, Deserialize)]
pub struct UseCouponRequest {
    pub use_location: String,
}

/// Coupon use response.
#[derive(Debug, Serialize)]
pub struct UseCouponResponse {
    pub coupon_id: CouponToken,
    pub status: CouponStatus,
    pub use_location: String,
}

fn parse_token(raw: &str) -> Result<CouponToken> {
    raw.parse()
        .map_err(|_| AppError::BadRequest("invalid coupon id".to_string()))
}

/// Redeem a promotion and issue a coupon.
///
/// POST /api/redeem
#[instrument(skip(state, request))]
pub async fn redeem(
    State(state): State<AppState>,
    Json(request): Json<RedemptionRequest>,
) -> Result<Json<Redemption>> {
    Ok(Json(state.ledger().redeem(request).await?))
}

/// Coupon details for staff scanning a coupon.
///
/// GET /api/coupon/{coupon_id}
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(coupon_id): Path<String>,
) -> Result<Json<CouponDetails>> {
    let token = parse_token(&coupon_id)?;
    let details = TransactionRepository::new(state.pool())
        .coupon_details(token)
        .await?
        .ok_or(LedgerError::CouponNotFound)?;
    Ok(Json(details))
}

/// Every coupon held by a member.
///
/// GET /api/user-coupons/{user_id}
#[instrument(skip(state))]
pub async fn list_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<UserCoupon>>> {
    let external_id = parse_external_id(&user_id)?;
    let coupons = TransactionRepository::new(state.pool())
        .coupons_for_user(&external_id)
        .await?;
    Ok(Json(coupons))
}

/// Mark a coupon as used.
///
/// PUT /api/coupon-use/{coupon_id}
#[instrument(skip(state, staff, request), fields(staff = %staff.name))]
pub async fn use_coupon(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(coupon_id): Path<String>,
    Json(request): Json<UseCouponRequest>,
) -> Result<Json<UseCouponResponse>> {
    let token = parse_token(&coupon_id)?;
    state
        .ledger()
        .use_coupon(token, &request.use_location)
        .await?;

    Ok(Json(UseCouponResponse {
        coupon_id: token,
        status: CouponStatus::Used,
        use_location: request.use_location.trim().to_owned(),
    }))
}
