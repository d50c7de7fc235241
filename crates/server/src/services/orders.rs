//! Order transaction manager.
//!
//! Owns the two flows where money and cart state meet:
//!
//! - `create_from_cart` converts the mutable cart into an immutable priced
//!   order inside one database transaction. Prices are re-resolved from the
//!   catalog at conversion time, never trusted from the cart. The cart itself
//!   is left untouched so a failed payment attempt can retry order creation
//!   with the same contents.
//! - `confirm_payment` is the idempotent completion path shared by the
//!   explicit confirm endpoint and the Stripe webhook. Its one cross-entity
//!   side effect is clearing the owner's cart.
//!
//! Both flows retry once on a transient serialization conflict before
//! surfacing the error. Neither ever calls the payment gateway; gateway calls
//! happen strictly outside database transactions.

use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{info, warn};

use mealbridge_core::pricing::{self, Totals};
use mealbridge_core::{AddressId, OrderId, OrderLineId, PaymentStatus, UserId};

use crate::db::is_retryable;
use crate::models::{Order, OrderLine};

/// Errors from the order transaction manager.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The user's cart has no lines; a business-rule rejection, not a fault.
    #[error("cart is empty")]
    EmptyCart,

    /// The delivery address does not exist or belongs to another user.
    #[error("delivery address not found")]
    AddressNotFound,

    /// The order does not exist (or is not visible to the caller).
    #[error("order not found")]
    NotFound,

    /// Underlying storage failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// An order together with its frozen lines.
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order: Order,
    pub lines: Vec<OrderLine>,
    pub totals: Totals,
}

/// A cart line resolved against the live catalog price.
#[derive(Debug, sqlx::FromRow)]
struct PricedLine {
    meal_id: mealbridge_core::MealId,
    quantity: i32,
    price: Decimal,
}

/// The cart-to-order transaction manager and payment state machine.
pub struct OrderService<'a> {
    pool: &'a PgPool,
    tax_rate: Decimal,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, tax_rate: Decimal) -> Self {
        Self { pool, tax_rate }
    }

    /// Convert the user's cart into an immutable order.
    ///
    /// Runs as a single transaction: the cart row is locked, lines are read
    /// joined with current catalog prices, totals come from the pricing
    /// engine, and the order plus its lines are inserted atomically. Partial
    /// writes are never observable; any failure rolls the whole thing back.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::EmptyCart` if the cart has no lines and
    /// `OrderError::AddressNotFound` if the delivery address is not the
    /// caller's.
    pub async fn create_from_cart(
        &self,
        user_id: UserId,
        delivery_address_id: AddressId,
        special_instructions: Option<String>,
    ) -> Result<PlacedOrder, OrderError> {
        match self
            .try_create(user_id, delivery_address_id, special_instructions.clone())
            .await
        {
            Err(OrderError::Database(e)) if is_retryable(&e) => {
                warn!(user_id = %user_id, "retrying order creation after transient conflict");
                self.try_create(user_id, delivery_address_id, special_instructions)
                    .await
            }
            other => other,
        }
    }

    async fn try_create(
        &self,
        user_id: UserId,
        delivery_address_id: AddressId,
        special_instructions: Option<String>,
    ) -> Result<PlacedOrder, OrderError> {
        let mut tx = self.pool.begin().await?;

        // Lock the cart row so a concurrent conversion or mutation for the
        // same user serializes behind this transaction.
        let cart_id: Option<(mealbridge_core::CartId,)> =
            sqlx::query_as("SELECT id FROM carts WHERE user_id = $1 FOR UPDATE")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some((cart_id,)) = cart_id else {
            return Err(OrderError::EmptyCart);
        };

        let address: Option<(AddressId,)> =
            sqlx::query_as("SELECT id FROM addresses WHERE id = $1 AND user_id = $2")
                .bind(delivery_address_id)
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;
        if address.is_none() {
            return Err(OrderError::AddressNotFound);
        }

        // Re-resolve prices from the catalog; the cart stores no prices and
        // anything client-supplied would be open to stale-price abuse.
        let priced: Vec<PricedLine> = sqlx::query_as(
            r"
            SELECT cl.meal_id, cl.quantity, m.price
            FROM cart_lines cl
            JOIN meals m ON m.id = cl.meal_id
            WHERE cl.cart_id = $1
            ORDER BY cl.created_at
            ",
        )
        .bind(cart_id)
        .fetch_all(&mut *tx)
        .await?;

        if priced.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        let totals = pricing::compute_totals(
            priced
                .iter()
                .map(|l| (l.price, u32::try_from(l.quantity).unwrap_or(0))),
            self.tax_rate,
        );

        let order = sqlx::query_as::<_, Order>(
            r"
            INSERT INTO orders (id, user_id, delivery_address_id, total_price, special_instructions)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, delivery_address_id, total_price,
                      payment_status, order_status, stripe_payment_id, special_instructions,
                      created_at, updated_at
            ",
        )
        .bind(OrderId::generate())
        .bind(user_id)
        .bind(delivery_address_id)
        .bind(totals.total)
        .bind(special_instructions)
        .fetch_one(&mut *tx)
        .await?;

        let mut lines = Vec::with_capacity(priced.len());
        for line in &priced {
            let order_line = sqlx::query_as::<_, OrderLine>(
                r"
                INSERT INTO order_lines (id, order_id, meal_id, quantity, price_at_purchase)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, order_id, meal_id, quantity, price_at_purchase, created_at
                ",
            )
            .bind(OrderLineId::generate())
            .bind(order.id)
            .bind(line.meal_id)
            .bind(line.quantity)
            .bind(line.price)
            .fetch_one(&mut *tx)
            .await?;
            lines.push(order_line);
        }

        // The cart is deliberately NOT cleared here; that happens only on
        // payment confirmation.
        tx.commit().await?;

        info!(order_id = %order.id, user_id = %user_id, total = %order.total_price, "order created");

        Ok(PlacedOrder {
            order,
            lines,
            totals,
        })
    }

    /// Mark an order's payment as completed and clear the owner's cart.
    ///
    /// Idempotent: confirming an already-completed order is a success no-op,
    /// because payment webhooks can be delivered more than once. The update
    /// is conditional so a duplicate delivery can never regress a Refunded
    /// order back to Completed.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` if the order does not exist.
    pub async fn confirm_payment(
        &self,
        order_id: OrderId,
        external_ref: &str,
    ) -> Result<Order, OrderError> {
        match self.try_confirm(order_id, external_ref).await {
            Err(OrderError::Database(e)) if is_retryable(&e) => {
                warn!(order_id = %order_id, "retrying payment confirmation after transient conflict");
                self.try_confirm(order_id, external_ref).await
            }
            other => other,
        }
    }

    async fn try_confirm(
        &self,
        order_id: OrderId,
        external_ref: &str,
    ) -> Result<Order, OrderError> {
        let mut tx = self.pool.begin().await?;

        let order = sqlx::query_as::<_, Order>(
            r"
            SELECT id, user_id, delivery_address_id, total_price,
                   payment_status, order_status, stripe_payment_id, special_instructions,
                   created_at, updated_at
            FROM orders
            WHERE id = $1
            FOR UPDATE
            ",
        )
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(OrderError::NotFound)?;

        // Completed and Refunded are both final from this path's point of
        // view: a duplicate webhook must not re-run the transition or
        // overwrite a refund.
        if matches!(
            order.payment_status,
            PaymentStatus::Completed | PaymentStatus::Refunded
        ) {
            info!(order_id = %order_id, status = %order.payment_status, "payment already settled, no-op");
            return Ok(order);
        }

        let updated = sqlx::query_as::<_, Order>(
            r"
            UPDATE orders
            SET payment_status = 'completed', stripe_payment_id = $2, updated_at = now()
            WHERE id = $1
              AND payment_status NOT IN ('completed', 'refunded')
            RETURNING id, user_id, delivery_address_id, total_price,
                      payment_status, order_status, stripe_payment_id, special_instructions,
                      created_at, updated_at
            ",
        )
        .bind(order_id)
        .bind(external_ref)
        .fetch_one(&mut *tx)
        .await?;

        // The one place order and cart state couple: a paid order empties
        // the cart it came from. Clearing an already-empty cart is harmless.
        sqlx::query(
            r"
            DELETE FROM cart_lines cl
            USING carts c
            WHERE cl.cart_id = c.id
              AND c.user_id = $1
            ",
        )
        .bind(updated.user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(order_id = %order_id, external_ref, "payment confirmed, cart cleared");
        Ok(updated)
    }

    /// Mark a pending payment as failed.
    ///
    /// Conditional like [`Self::confirm_payment`]: only a Pending payment can
    /// move to Failed, so late failure webhooks cannot clobber a completed or
    /// refunded order.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` if the order does not exist.
    pub async fn mark_payment_failed(&self, order_id: OrderId) -> Result<Order, OrderError> {
        let updated = sqlx::query_as::<_, Order>(
            r"
            UPDATE orders
            SET payment_status = 'failed', updated_at = now()
            WHERE id = $1 AND payment_status = 'pending'
            RETURNING id, user_id, delivery_address_id, total_price,
                      payment_status, order_status, stripe_payment_id, special_instructions,
                      created_at, updated_at
            ",
        )
        .bind(order_id)
        .fetch_optional(self.pool)
        .await?;

        if let Some(order) = updated {
            return Ok(order);
        }

        // Not pending anymore (or missing entirely): fetch to tell the two
        // apart and return the settled row unchanged.
        let order = sqlx::query_as::<_, Order>(
            r"
            SELECT id, user_id, delivery_address_id, total_price,
                   payment_status, order_status, stripe_payment_id, special_instructions,
                   created_at, updated_at
            FROM orders
            WHERE id = $1
            ",
        )
        .bind(order_id)
        .fetch_optional(self.pool)
        .await?;

        order.ok_or(OrderError::NotFound)
    }
}
