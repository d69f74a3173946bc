//! JSON API smoke tests.
//!
//! These tests require a running server with a migrated database.
//! Run with: `cargo test -p loyalty-integration-tests --test http_api -- --ignored`
//!
//! Staff tests additionally need an existing account:
//! - `LOYALTY_TEST_STAFF_NAME`
//! - `LOYALTY_TEST_STAFF_PASSWORD`

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use loyalty_integration_tests::{base_url, client, unique_user_id};

async fn register(client: &Client, user_id: &str) -> reqwest::Response {
    client
        .post(format!("{}/api/users/register", base_url()))
        .json(&json!({ "user_id": user_id, "name": "Smoke Test", "phone": "0800000000" }))
        .send()
        .await
        .expect("Failed to send request")
}

async fn spend(client: &Client, user_id: &str, amount: &str) -> reqwest::Response {
    client
        .post(format!("{}/api/transactions", base_url()))
        .json(&json!({
            "user_id": user_id,
            "branch": "Smoke branch",
            "receipt_no": "SMOKE-1",
            "spending_value": amount,
        }))
        .send()
        .await
        .expect("Failed to send request")
}

async fn create_promotion(client: &Client, points_needed: i64, quantity: i32) -> i64 {
    let today = chrono::Utc::now().date_naive();
    let resp = client
        .post(format!("{}/api/promotions", base_url()))
        .json(&json!({
            "name": "Smoke promotion",
            "description": "Created by smoke tests",
            "points_needed": points_needed,
            "quantity": quantity,
            "start_date": today - chrono::Duration::days(1),
            "end_date": today + chrono::Duration::days(7),
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let promotion: Value = resp.json().await.unwrap();
    promotion["id"].as_i64().unwrap()
}

async fn redeem(client: &Client, user_id: &str, promotion_id: i64) -> reqwest::Response {
    client
        .post(format!("{}/api/redeem", base_url()))
        .json(&json!({ "user_id": user_id, "promotion_id": promotion_id, "branch": "Smoke branch" }))
        .send()
        .await
        .expect("Failed to send request")
}

/// Register a member holding four points.
async fn funded_member(client: &Client, prefix: &str) -> String {
    let user_id = unique_user_id(prefix);
    assert_eq!(register(client, &user_id).await.status(), StatusCode::CREATED);
    assert_eq!(spend(client, &user_id, "100").await.status(), StatusCode::CREATED);
    user_id
}

async fn login(client: &Client) -> Option<()> {
    let name = std::env::var("LOYALTY_TEST_STAFF_NAME").ok()?;
    let password = std::env::var("LOYALTY_TEST_STAFF_PASSWORD").ok()?;
    let resp = client
        .post(format!("{}/api/staff/login", base_url()))
        .json(&json!({ "name": name, "password": password }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), StatusCode::OK, "staff login failed");
    Some(())
}

#[tokio::test]
#[ignore = "Requires running loyalty server"]
async fn test_health_endpoints() {
    let client = client();

    let resp = client
        .get(format!("{}/health", base_url()))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{}/health/ready", base_url()))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running loyalty server"]
async fn test_register_and_duplicate() {
    let client = client();
    let user_id = unique_user_id("smoke");

    let resp = register(&client, &user_id).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["user_id"], user_id.as_str());

    let resp = register(&client, &user_id).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].is_string());

    let resp = client
        .get(format!("{}/api/users/check/{user_id}", base_url()))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running loyalty server"]
async fn test_unknown_member_is_not_found() {
    let client = client();
    let user_id = unique_user_id("ghost");

    let resp = client
        .get(format!("{}/api/users/check/{user_id}", base_url()))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = spend(&client, &user_id, "100").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running loyalty server"]
async fn test_spending_updates_user_info() {
    let client = client();
    let user_id = unique_user_id("smoke");
    assert_eq!(register(&client, &user_id).await.status(), StatusCode::CREATED);

    let resp = spend(&client, &user_id, "130.00").await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["points"], 5);

    let resp = spend(&client, &user_id, "0").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = client
        .get(format!("{}/api/user-info/{user_id}", base_url()))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["total_points"], 5);
}

#[tokio::test]
#[ignore = "Requires running loyalty server"]
async fn test_staff_routes_require_login() {
    let client = client();

    let resp = client
        .get(format!("{}/api/transactions", base_url()))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = client
        .post(format!("{}/api/promotions", base_url()))
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running loyalty server and staff credentials"]
async fn test_redeem_and_use_coupon() {
    let client = client();
    if login(&client).await.is_none() {
        return;
    }

    let promotion_id = create_promotion(&client, 2, 1).await;
    let user_id = funded_member(&client, "smoke").await;

    let resp = redeem(&client, &user_id, promotion_id).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["balance"], 2);
    let coupon_id = body["coupon_id"].as_str().unwrap().to_owned();

    // Last unit is gone
    let resp = redeem(&client, &user_id, promotion_id).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let use_coupon = || {
        client
            .put(format!("{}/api/coupon-use/{coupon_id}", base_url()))
            .json(&json!({ "use_location": "Smoke branch" }))
            .send()
    };
    assert_eq!(use_coupon().await.unwrap().status(), StatusCode::OK);
    assert_eq!(use_coupon().await.unwrap().status(), StatusCode::CONFLICT);

    let resp = client
        .get(format!("{}/api/coupon/{coupon_id}", base_url()))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "used");
}

#[tokio::test]
#[ignore = "Requires running loyalty server"]
async fn test_concurrent_registration_creates_one_member() {
    let client = client();
    let user_id = unique_user_id("race");

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let client = client.clone();
            let user_id = user_id.clone();
            tokio::spawn(async move { register(&client, &user_id).await.status() })
        })
        .collect();

    let mut statuses = Vec::new();
    for handle in handles {
        statuses.push(handle.await.unwrap());
    }

    let created = statuses.iter().filter(|s| **s == StatusCode::CREATED).count();
    let conflicts = statuses.iter().filter(|s| **s == StatusCode::CONFLICT).count();
    assert_eq!(created, 1, "statuses: {statuses:?}");
    assert_eq!(conflicts, statuses.len() - 1, "statuses: {statuses:?}");
}

#[tokio::test]
#[ignore = "Requires running loyalty server and staff credentials"]
async fn test_concurrent_redemptions_sell_last_unit_once() {
    let client = client();
    if login(&client).await.is_none() {
        return;
    }
    let promotion_id = create_promotion(&client, 2, 1).await;

    let mut members = Vec::new();
    for _ in 0..8 {
        members.push(funded_member(&client, "race").await);
    }

    let handles: Vec<_> = members
        .into_iter()
        .map(|user_id| {
            let client = client.clone();
            tokio::spawn(async move { redeem(&client, &user_id, promotion_id).await.status() })
        })
        .collect();

    let mut statuses = Vec::new();
    for handle in handles {
        statuses.push(handle.await.unwrap());
    }

    let redeemed = statuses.iter().filter(|s| **s == StatusCode::OK).count();
    let conflicts = statuses.iter().filter(|s| **s == StatusCode::CONFLICT).count();
    assert_eq!(redeemed, 1, "statuses: {statuses:?}");
    assert_eq!(conflicts, statuses.len() - 1, "statuses: {statuses:?}");

    let resp = client
        .get(format!("{}/api/promotions/{promotion_id}", base_url()))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), StatusCode::OK);
    let promotion: Value = resp.json().await.unwrap();
    assert_eq!(promotion["quantity"], 0);
}

#[tokio::test]
#[ignore = "Requires running loyalty server and staff credentials"]
async fn test_concurrent_coupon_use_succeeds_once() {
    let client = client();
    if login(&client).await.is_none() {
        return;
    }
    let promotion_id = create_promotion(&client, 2, 1).await;
    let user_id = funded_member(&client, "race").await;
    let resp = redeem(&client, &user_id, promotion_id).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    let coupon_id = body["coupon_id"].as_str().unwrap().to_owned();

    // Clones share the logged-in cookie jar
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let client = client.clone();
            let coupon_id = coupon_id.clone();
            tokio::spawn(async move {
                client
                    .put(format!("{}/api/coupon-use/{coupon_id}", base_url()))
                    .json(&json!({ "use_location": format!("Branch {i}") }))
                    .send()
                    .await
                    .expect("Failed to send request")
                    .status()
            })
        })
        .collect();

    let mut statuses = Vec::new();
    for handle in handles {
        statuses.push(handle.await.unwrap());
    }

    let used = statuses.iter().filter(|s| **s == StatusCode::OK).count();
    let conflicts = statuses.iter().filter(|s| **s == StatusCode::CONFLICT).count();
    assert_eq!(used, 1, "statuses: {statuses:?}");
    assert_eq!(conflicts, statuses.len() - 1, "statuses: {statuses:?}");
}
