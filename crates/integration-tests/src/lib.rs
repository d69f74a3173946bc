//! Integration tests for the loyalty ledger.
//!
//! # Running Tests
//!
//! ```bash
//! # Ledger properties (in-memory, no services needed)
//! cargo test -p loyalty-integration-tests
//!
//! # HTTP smoke tests against a running server
//! cargo run -p loyalty-cli -- migrate
//! cargo run -p loyalty-server &
//! cargo test -p loyalty-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `ledger_properties` - Ledger invariants over `MemoryStore`
//! - `http_api` - JSON API smoke tests (`#[ignore]`, need a server)

#![cfg_attr(not(test), forbid(unsafe_code))]

use chrono::{Duration, Utc};
use reqwest::Client;
use rust_decimal::Decimal;

use loyalty_server::ledger::{
    LedgerService, MemoryStore, NewSpending, RedemptionRequest, RegisterUser,
};
use loyalty_server::models::PromotionInput;

use loyalty_core::PromotionId;

/// Base URL of the server under test (`LOYALTY_TEST_BASE_URL`).
#[must_use]
pub fn base_url() -> String {
    std::env::var("LOYALTY_TEST_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// HTTP client that keeps the session cookie between requests.
///
/// # Panics
///
/// Panics if the TLS backend cannot be initialized.
#[must_use]
#[allow(clippy::expect_used)]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// A member id that will not collide with earlier test runs.
#[must_use]
pub fn unique_user_id(prefix: &str) -> String {
    format!("{prefix}-{}", uuid::Uuid::new_v4().simple())
}

/// A promotion valid from yesterday for a month.
#[must_use]
pub fn promotion(points_needed: i64, quantity: i32) -> PromotionInput {
    let today = Utc::now().date_naive();
    PromotionInput {
        name: "Test promotion".to_owned(),
        description: "Created by integration tests".to_owned(),
        points_needed,
        quantity,
        start_date: today - Duration::days(1),
        end_date: today + Duration::days(30),
        image_url: None,
    }
}

/// Registration payload with fixed name and phone.
#[must_use]
pub fn registration(user_id: &str) -> RegisterUser {
    RegisterUser {
        user_id: user_id.to_owned(),
        name: "Test Member".to_owned(),
        phone: "0800000000".to_owned(),
    }
}

/// Spending payload at the test branch.
#[must_use]
pub fn spending(user_id: &str, amount: Decimal) -> NewSpending {
    NewSpending {
        user_id: user_id.to_owned(),
        branch: "Test branch".to_owned(),
        receipt_no: format!("R-{}", uuid::Uuid::new_v4().simple()),
        receipt_photo_url: None,
        spending_value: Some(amount),
        timestamp: None,
    }
}

/// Redemption payload at the test branch.
#[must_use]
pub fn redemption(user_id: &str, promotion_id: PromotionId) -> RedemptionRequest {
    RedemptionRequest {
        user_id: user_id.to_owned(),
        promotion_id,
        branch: "Test branch".to_owned(),
    }
}

/// A fresh in-memory ledger.
#[must_use]
pub fn memory_ledger() -> LedgerService<MemoryStore> {
    LedgerService::new(MemoryStore::new())
}
