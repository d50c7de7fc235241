//! Integration tests for MealBridge.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and run migrations
//! mb-cli migrate
//!
//! # Seed sample data (prints demo and admin API tokens)
//! mb-cli seed
//!
//! # Start the server, then run the ignored tests
//! cargo test -p mealbridge-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `MEALBRIDGE_BASE_URL` - Server base URL (default `http://localhost:3000`)
//! - `MEALBRIDGE_TEST_TOKEN` - API token for the test account
//! - `MEALBRIDGE_ADMIN_TOKEN` - API token for the seeded admin account

use reqwest::Client;

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("MEALBRIDGE_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Bearer token for the test account, from `MEALBRIDGE_TEST_TOKEN`.
///
/// # Panics
///
/// Panics when the variable is unset; these tests cannot run without it.
#[must_use]
pub fn bearer_token() -> String {
    std::env::var("MEALBRIDGE_TEST_TOKEN")
        .expect("MEALBRIDGE_TEST_TOKEN must be set for integration tests")
}

/// Bearer token for the admin account, from `MEALBRIDGE_ADMIN_TOKEN`.
///
/// # Panics
///
/// Panics when the variable is unset; the admin tests cannot run without it.
#[must_use]
pub fn admin_token() -> String {
    std::env::var("MEALBRIDGE_ADMIN_TOKEN")
        .expect("MEALBRIDGE_ADMIN_TOKEN must be set for admin integration tests")
}

/// HTTP client with the test account's bearer token attached by default.
///
/// # Panics
///
/// Panics if the client cannot be constructed.
#[must_use]
pub fn authenticated_client() -> Client {
    client_with_token(&bearer_token())
}

/// HTTP client with the admin account's bearer token attached by default.
///
/// # Panics
///
/// Panics if the client cannot be constructed.
#[must_use]
pub fn admin_client() -> Client {
    client_with_token(&admin_token())
}

fn client_with_token(token: &str) -> Client {
    let mut headers = reqwest::header::HeaderMap::new();
    let value = format!("Bearer {token}");
    headers.insert(
        reqwest::header::AUTHORIZATION,
        value.parse().expect("token is valid header value"),
    );
    Client::builder()
        .default_headers(headers)
        .build()
        .expect("Failed to create HTTP client")
}
