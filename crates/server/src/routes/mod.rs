//! HTTP route handlers for the loyalty API.
//!
//! # Route Structure
//!
//! ```text
//! # Members (public)
//! POST /api/users/register              - Register a member
//! GET  /api/users/check/{user_id}       - Existence check
//! GET  /api/user-info/{user_id}         - Lifetime spending and balance
//! GET  /api/user-transactions/{user_id} - Ledger of one member
//! GET  /api/user-coupons/{user_id}      - Coupons of one member
//!
//! # Ledger (public)
//! POST /api/transactions                - Record spending
//! POST /api/redeem                      - Redeem a promotion
//! GET  /api/coupon/{coupon_id}          - Coupon details
//! GET  /api/promotions                  - Promotion list
//! GET  /api/promotions/{id}             - Promotion detail
//!
//! # Staff session
//! POST /api/staff/login                 - Login
//! POST /api/staff/logout                - Logout
//!
//! # Staff only
//! GET    /api/users                     - List members
//! PUT    /api/users/{id}                - Update member
//! DELETE /api/users/{id}                - Delete member without history
//! GET    /api/transactions              - Full ledger
//! PUT    /api/coupon-use/{coupon_id}    - Mark coupon used
//! POST   /api/promotions                - Create promotion
//! PUT    /api/promotions/{id}           - Update promotion
//! DELETE /api/promotions/{id}           - Delete unreferenced promotion
//! GET    /api/staff                     - List staff
//! GET    /api/staff/me                  - Current staff identity
//!
//! # Admin only
//! POST   /api/staff/register            - Create staff account
//! PUT    /api/staff/{id}                - Update staff account
//! DELETE /api/staff/{id}                - Delete staff account
//! ```

pub mod coupons;
pub mod promotions;
pub mod staff;
pub mod transactions;
pub mod users;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Build the complete `/api` router.
pub fn routes() -> Router<AppState> {
    Router::new().nest("/api", api_routes())
}

fn api_routes() -> Router<AppState> {
    Router::new()
        // Members
        .route("/users", get(users::list))
        .route("/users/register", post(users::register))
        .route("/users/check/{user_id}", get(users::check))
        .route("/users/{id}", put(users::update).delete(users::delete))
        .route("/user-info/{user_id}", get(users::info))
        .route("/user-transactions/{user_id}", get(transactions::list_for_user))
        .route("/user-coupons/{user_id}", get(coupons::list_for_user))
        // Ledger
        .route(
            "/transactions",
            get(transactions::list).post(transactions::record_spending),
        )
        .route("/redeem", post(coupons::redeem))
        .route("/coupon/{coupon_id}", get(coupons::show))
        .route("/coupon-use/{coupon_id}", put(coupons::use_coupon))
        // Promotions
        .route("/promotions", get(promotions::list).post(promotions::create))
        .route(
            "/promotions/{id}",
            get(promotions::show)
                .put(promotions::update)
                .delete(promotions::delete),
        )
        // Staff
        .route("/staff", get(staff::list))
        .route("/staff/me", get(staff::me))
        .route("/staff/login", post(staff::login))
        .route("/staff/logout", post(staff::logout))
        .route("/staff/register", post(staff::register))
        .route("/staff/{id}", put(staff::update).delete(staff::delete))
}
