//! Integration tests for the cart API.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied (mb-cli migrate)
//! - Seeded sample data (mb-cli seed)
//! - The server running (cargo run -p mealbridge-server)
//! - `MEALBRIDGE_TEST_TOKEN` set to the seeded demo token
//!
//! Run with: cargo test -p mealbridge-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};

use mealbridge_integration_tests::{authenticated_client, base_url};

/// Test helper: fetch the first available meal from the catalog.
async fn first_available_meal() -> Value {
    let client = authenticated_client();
    let resp = client
        .get(format!("{}/meals", base_url()))
        .send()
        .await
        .expect("Failed to list meals");
    assert_eq!(resp.status(), StatusCode::OK);

    let meals: Vec<Value> = resp.json().await.expect("Failed to parse meals");
    meals.into_iter().next().expect("Seeded catalog is empty")
}

/// Test helper: empty the cart so tests start from a known state.
async fn clear_cart() {
    let client = authenticated_client();
    let resp = client
        .delete(format!("{}/cart", base_url()))
        .send()
        .await
        .expect("Failed to clear cart");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
#[ignore = "Requires running server and seeded database"]
async fn health_endpoints_respond() {
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{}/health", base_url()))
        .send()
        .await
        .expect("Failed to reach /health");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{}/health/ready", base_url()))
        .send()
        .await
        .expect("Failed to reach /health/ready");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running server and seeded database"]
async fn empty_cart_has_zero_totals() {
    clear_cart().await;

    let client = authenticated_client();
    let resp = client
        .get(format!("{}/cart", base_url()))
        .send()
        .await
        .expect("Failed to get cart");
    assert_eq!(resp.status(), StatusCode::OK);

    let cart: Value = resp.json().await.expect("Failed to parse cart");
    assert_eq!(cart["lines"].as_array().map(Vec::len), Some(0));
    for field in ["subtotal", "tax", "total"] {
        let amount: f64 = cart[field]
            .as_str()
            .expect("totals are decimal strings")
            .parse()
            .expect("totals parse as numbers");
        assert_eq!(amount, 0.0, "{field} should be zero");
    }
}

#[tokio::test]
#[ignore = "Requires running server and seeded database"]
async fn adding_same_meal_twice_merges_quantities() {
    clear_cart().await;

    let meal = first_available_meal().await;
    let client = authenticated_client();

    for _ in 0..2 {
        let resp = client
            .post(format!("{}/cart/items", base_url()))
            .json(&json!({ "meal_id": meal["id"], "quantity": 2 }))
            .send()
            .await
            .expect("Failed to add item");
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let cart: Value = client
        .get(format!("{}/cart", base_url()))
        .send()
        .await
        .expect("Failed to get cart")
        .json()
        .await
        .expect("Failed to parse cart");

    let lines = cart["lines"].as_array().expect("lines is an array");
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["quantity"], 4);
}

#[tokio::test]
#[ignore = "Requires running server and seeded database"]
async fn zero_quantity_is_rejected() {
    let meal = first_available_meal().await;
    let client = authenticated_client();

    let resp = client
        .post(format!("{}/cart/items", base_url()))
        .json(&json!({ "meal_id": meal["id"], "quantity": 0 }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running server and seeded database"]
async fn unknown_meal_returns_not_found() {
    let client = authenticated_client();

    let resp = client
        .post(format!("{}/cart/items", base_url()))
        .json(&json!({
            "meal_id": "00000000-0000-0000-0000-000000000000",
            "quantity": 1
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running server and seeded database"]
async fn requests_without_token_are_unauthorized() {
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{}/cart", base_url()))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
