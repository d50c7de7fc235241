//! Order repository: reads and administrative status updates.
//!
//! Order creation and payment confirmation are transactional flows owned by
//! [`crate::services::orders::OrderService`]; this repository covers the
//! non-transactional side (fetch, list, fulfillment status).

use sqlx::{PgPool, Postgres, QueryBuilder};

use mealbridge_core::{OrderId, OrderStatus, UserId};

use super::RepositoryError;
use crate::models::{Order, OrderLine};

/// Hard cap on page size for order listings.
pub const MAX_PAGE_SIZE: i64 = 100;

const ORDER_COLUMNS: &str = "id, user_id, delivery_address_id, total_price, \
     payment_status, order_status, stripe_payment_id, special_instructions, \
     created_at, updated_at";

/// Repository for order read operations and status transitions.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an order by ID.
    ///
    /// When `requesting_user` is supplied the order is only returned if it
    /// belongs to that user, which keeps one account from enumerating
    /// another's orders. Administrative callers pass `None`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        id: OrderId,
        requesting_user: Option<UserId>,
    ) -> Result<Option<Order>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 AND ($2::uuid IS NULL OR user_id = $2)"
        ))
        .bind(id)
        .bind(requesting_user)
        .fetch_optional(self.pool)
        .await?;

        Ok(order)
    }

    /// Load the frozen lines of an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lines(&self, id: OrderId) -> Result<Vec<OrderLine>, RepositoryError> {
        let lines = sqlx::query_as::<_, OrderLine>(
            r"
            SELECT id, order_id, meal_id, quantity, price_at_purchase, created_at
            FROM order_lines
            WHERE order_id = $1
            ORDER BY created_at
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(lines)
    }

    /// List orders, newest first, with offset/limit pagination.
    ///
    /// `user` restricts the listing to one account (customer view); `None` is
    /// the administrative view over all orders. `limit` is clamped to
    /// [`MAX_PAGE_SIZE`].
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        user: Option<UserId>,
        status: Option<OrderStatus>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Order>, RepositoryError> {
        let mut query: QueryBuilder<'_, Postgres> =
            QueryBuilder::new(format!("SELECT {ORDER_COLUMNS} FROM orders WHERE true"));

        if let Some(user_id) = user {
            query.push(" AND user_id = ");
            query.push_bind(user_id);
        }
        if let Some(status) = status {
            query.push(" AND order_status = ");
            query.push_bind(status);
        }

        query.push(" ORDER BY created_at DESC OFFSET ");
        query.push_bind(offset.max(0));
        query.push(" LIMIT ");
        query.push_bind(limit.clamp(1, MAX_PAGE_SIZE));

        let orders = query.build_query_as::<Order>().fetch_all(self.pool).await?;

        Ok(orders)
    }

    /// Set an order's fulfillment status.
    ///
    /// A single-field update plus `updated_at` refresh; no side effects on
    /// cart or payment state.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    pub async fn update_status(
        &self,
        id: OrderId,
        new_status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "UPDATE orders SET order_status = $2, updated_at = now() \
             WHERE id = $1 RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(new_status)
        .fetch_optional(self.pool)
        .await?;

        order.ok_or(RepositoryError::NotFound)
    }
}
