//! Database operations for the Mealbridge `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `users` - Customer accounts (auth token issuance lives elsewhere)
//! - `api_tokens` - Bearer tokens accepted by the HTTP layer
//! - `addresses` - Delivery addresses, at most one default per user
//! - `meals` - Menu catalog with current prices and availability
//! - `carts` / `cart_lines` - One mutable pre-order cart per user
//! - `orders` / `order_lines` - Immutable priced order snapshots
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p mealbridge-cli -- migrate
//! ```

pub mod addresses;
pub mod carts;
pub mod meals;
pub mod orders;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use addresses::AddressRepository;
pub use carts::CartRepository;
pub use meals::MealRepository;
pub use orders::OrderRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Requested entity was not found (or not owned by the caller).
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email, duplicate default address).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Whether a database error is a transient conflict worth one internal retry.
///
/// Covers serialization failures (40001) and deadlocks (40P01); everything
/// else is surfaced to the caller.
#[must_use]
pub fn is_retryable(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        matches!(db_err.code().as_deref(), Some("40001" | "40P01"))
    } else {
        false
    }
}
