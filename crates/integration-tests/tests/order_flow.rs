//! Integration tests for the order and payment APIs.
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

use mealbridge_integration_tests::{admin_client, authenticated_client, base_url};

/// Test helper: ensure the cart holds one line of the first catalog meal.
async fn fill_cart() {
    let client = authenticated_client();

    let resp = client
        .delete(format!("{}/cart", base_url()))
        .send()
        .await
        .expect("Failed to clear cart");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let meals: Vec<Value> = client
        .get(format!("{}/meals", base_url()))
        .send()
        .await
        .expect("Failed to list meals")
        .json()
        .await
        .expect("Failed to parse meals");
    let meal = meals.first().expect("Seeded catalog is empty");

    let resp = client
        .post(format!("{}/cart/items", base_url()))
        .json(&json!({ "meal_id": meal["id"], "quantity": 1 }))
        .send()
        .await
        .expect("Failed to add item");
    assert_eq!(resp.status(), StatusCode::CREATED);
}

/// Test helper: create a delivery address and return its id.
async fn create_address() -> Value {
    let client = authenticated_client();
    let resp = client
        .post(format!("{}/addresses", base_url()))
        .json(&json!({
            "street_address": "123 Test Lane",
            "city": "Springfield",
            "state": "IL",
            "postal_code": "62701"
        }))
        .send()
        .await
        .expect("Failed to create address");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let address: Value = resp.json().await.expect("Failed to parse address");
    address["id"].clone()
}

#[tokio::test]
#[ignore = "Requires running server and seeded database"]
async fn order_from_empty_cart_is_rejected() {
    let client = authenticated_client();

    let resp = client
        .delete(format!("{}/cart", base_url()))
        .send()
        .await
        .expect("Failed to clear cart");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let address_id = create_address().await;
    let resp = client
        .post(format!("{}/orders", base_url()))
        .json(&json!({ "delivery_address_id": address_id }))
        .send()
        .await
        .expect("Failed to create order");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running server and seeded database"]
async fn order_creation_freezes_prices_and_keeps_cart() {
    fill_cart().await;
    let address_id = create_address().await;

    let client = authenticated_client();
    let resp = client
        .post(format!("{}/orders", base_url()))
        .json(&json!({
            "delivery_address_id": address_id,
            "special_instructions": "Leave at the door"
        }))
        .send()
        .await
        .expect("Failed to create order");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let order: Value = resp.json().await.expect("Failed to parse order");
    assert_eq!(order["payment_status"], "pending");
    assert_eq!(order["order_status"], "pending");
    let lines = order["lines"].as_array().expect("lines is an array");
    assert_eq!(lines.len(), 1);
    assert!(lines[0]["price_at_purchase"].is_string());

    // Cart must survive until payment is confirmed
    let cart: Value = client
        .get(format!("{}/cart", base_url()))
        .send()
        .await
        .expect("Failed to get cart")
        .json()
        .await
        .expect("Failed to parse cart");
    assert_eq!(cart["lines"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
#[ignore = "Requires running server and seeded database"]
async fn orders_list_is_scoped_and_paginated() {
    let client = authenticated_client();

    let resp = client
        .get(format!("{}/orders?offset=0&limit=5", base_url()))
        .send()
        .await
        .expect("Failed to list orders");
    assert_eq!(resp.status(), StatusCode::OK);

    let orders: Vec<Value> = resp.json().await.expect("Failed to parse orders");
    assert!(orders.len() <= 5);
}

#[tokio::test]
#[ignore = "Requires running server and seeded database"]
async fn foreign_order_looks_missing() {
    let client = authenticated_client();

    let resp = client
        .get(format!(
            "{}/orders/00000000-0000-0000-0000-000000000000",
            base_url()
        ))
        .send()
        .await
        .expect("Failed to get order");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running server, seeded database, and Stripe test keys"]
async fn payment_intent_carries_order_amount() {
    fill_cart().await;
    let address_id = create_address().await;

    let client = authenticated_client();
    let order: Value = client
        .post(format!("{}/orders", base_url()))
        .json(&json!({ "delivery_address_id": address_id }))
        .send()
        .await
        .expect("Failed to create order")
        .json()
        .await
        .expect("Failed to parse order");

    let resp = client
        .post(format!("{}/payments/intent", base_url()))
        .json(&json!({ "order_id": order["id"] }))
        .send()
        .await
        .expect("Failed to create intent");
    assert_eq!(resp.status(), StatusCode::OK);

    let intent: Value = resp.json().await.expect("Failed to parse intent");
    assert!(intent["client_secret"].is_string());
    assert_eq!(intent["amount"], order["total_price"]);
}

/// Test helper: a payment reference unique across runs.
fn unique_payment_ref() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock is after the epoch")
        .as_nanos();
    format!("pi_test_{nanos}")
}

#[tokio::test]
#[ignore = "Requires running server and seeded database"]
async fn confirming_payment_twice_is_a_harmless_no_op() {
    fill_cart().await;
    let address_id = create_address().await;

    let client = authenticated_client();
    let order: Value = client
        .post(format!("{}/orders", base_url()))
        .json(&json!({ "delivery_address_id": address_id }))
        .send()
        .await
        .expect("Failed to create order")
        .json()
        .await
        .expect("Failed to parse order");

    let payment_ref = unique_payment_ref();
    let resp = client
        .post(format!("{}/payments/confirm", base_url()))
        .json(&json!({ "order_id": order["id"], "payment_intent_id": payment_ref }))
        .send()
        .await
        .expect("Failed to confirm payment");
    assert_eq!(resp.status(), StatusCode::OK);
    let confirmed: Value = resp.json().await.expect("Failed to parse order");
    assert_eq!(confirmed["payment_status"], "completed");

    // Confirmation empties the cart
    let cart: Value = client
        .get(format!("{}/cart", base_url()))
        .send()
        .await
        .expect("Failed to get cart")
        .json()
        .await
        .expect("Failed to parse cart");
    assert_eq!(cart["lines"].as_array().map(Vec::len), Some(0));

    // A duplicate confirmation succeeds without changing anything
    let resp = client
        .post(format!("{}/payments/confirm", base_url()))
        .json(&json!({ "order_id": order["id"], "payment_intent_id": payment_ref }))
        .send()
        .await
        .expect("Failed to confirm payment");
    assert_eq!(resp.status(), StatusCode::OK);
    let again: Value = resp.json().await.expect("Failed to parse order");
    assert_eq!(again["payment_status"], "completed");
    assert_eq!(again["stripe_payment_id"], confirmed["stripe_payment_id"]);
    assert_eq!(again["total_price"], confirmed["total_price"]);
}

#[tokio::test]
#[ignore = "Requires running server, seeded database, and MEALBRIDGE_ADMIN_TOKEN"]
async fn catalog_price_change_leaves_placed_orders_untouched() {
    fill_cart().await;
    let address_id = create_address().await;

    let client = authenticated_client();
    let order: Value = client
        .post(format!("{}/orders", base_url()))
        .json(&json!({ "delivery_address_id": address_id }))
        .send()
        .await
        .expect("Failed to create order")
        .json()
        .await
        .expect("Failed to parse order");
    let order_id = order["id"].as_str().expect("order id is a string");
    let meal_id = order["lines"][0]["meal_id"]
        .as_str()
        .expect("meal id is a string");
    let frozen_price = order["lines"][0]["price_at_purchase"].clone();
    let frozen_total = order["total_price"].clone();

    let admin = admin_client();
    let resp = admin
        .patch(format!("{}/admin/meals/{meal_id}/price", base_url()))
        .json(&json!({ "price": "99.99" }))
        .send()
        .await
        .expect("Failed to update price");
    assert_eq!(resp.status(), StatusCode::OK);
    let meal: Value = resp.json().await.expect("Failed to parse meal");
    assert_eq!(meal["price"], "99.99");

    // The placed order keeps the price it was created with
    let fetched: Value = client
        .get(format!("{}/orders/{order_id}", base_url()))
        .send()
        .await
        .expect("Failed to get order")
        .json()
        .await
        .expect("Failed to parse order");
    assert_eq!(fetched["lines"][0]["price_at_purchase"], frozen_price);
    assert_eq!(fetched["total_price"], frozen_total);

    // Put the catalog back so later runs see the seeded price
    let resp = admin
        .patch(format!("{}/admin/meals/{meal_id}/price", base_url()))
        .json(&json!({ "price": frozen_price }))
        .send()
        .await
        .expect("Failed to restore price");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running server and seeded database"]
async fn webhook_without_signature_is_rejected() {
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/payments/webhook", base_url()))
        .body("{}")
        .send()
        .await
        .expect("Failed to post webhook");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
