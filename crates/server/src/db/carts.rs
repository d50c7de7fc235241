//! Cart repository.
//!
//! One cart per user. Lines are keyed by (cart, meal): adding a meal that is
//! already in the cart increments its quantity instead of creating a second
//! line. Quantity validation (> 0) happens at the HTTP boundary; this layer
//! relies on the database CHECK constraint as a backstop.

use sqlx::PgPool;

use mealbridge_core::{CartId, CartLineId, MealId, UserId};

use super::RepositoryError;
use crate::models::{Cart, CartLine, CartLineView};

/// Repository for cart operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the user's cart, creating an empty one if none exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_or_create(&self, user_id: UserId) -> Result<Cart, RepositoryError> {
        // The no-op DO UPDATE makes RETURNING yield the existing row on
        // conflict instead of returning nothing.
        let cart = sqlx::query_as::<_, Cart>(
            r"
            INSERT INTO carts (id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE SET user_id = carts.user_id
            RETURNING id, user_id, created_at, updated_at
            ",
        )
        .bind(CartId::generate())
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(cart)
    }

    /// Load the user's cart lines joined with current meal names and prices.
    ///
    /// Empty when the user has no cart yet.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lines(&self, user_id: UserId) -> Result<Vec<CartLineView>, RepositoryError> {
        let lines = sqlx::query_as::<_, CartLineView>(
            r"
            SELECT cl.id, cl.meal_id, m.name, cl.quantity, m.price AS unit_price
            FROM cart_lines cl
            JOIN carts c ON c.id = cl.cart_id
            JOIN meals m ON m.id = cl.meal_id
            WHERE c.user_id = $1
            ORDER BY cl.created_at
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(lines)
    }

    /// Add a meal to the user's cart, incrementing the quantity if a line for
    /// that meal already exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the meal does not exist.
    pub async fn add_item(
        &self,
        user_id: UserId,
        meal_id: MealId,
        quantity: i32,
    ) -> Result<CartLine, RepositoryError> {
        let cart = self.get_or_create(user_id).await?;

        let line = sqlx::query_as::<_, CartLine>(
            r"
            INSERT INTO cart_lines (id, cart_id, meal_id, quantity)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (cart_id, meal_id) DO UPDATE
                SET quantity = cart_lines.quantity + EXCLUDED.quantity,
                    updated_at = now()
            RETURNING id, cart_id, meal_id, quantity, created_at, updated_at
            ",
        )
        .bind(CartLineId::generate())
        .bind(cart.id)
        .bind(meal_id)
        .bind(quantity)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::NotFound;
            }
            RepositoryError::Database(e)
        })?;

        Ok(line)
    }

    /// Set the quantity of a cart line owned by the user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line is not in the user's
    /// cart.
    pub async fn update_line(
        &self,
        user_id: UserId,
        line_id: CartLineId,
        quantity: i32,
    ) -> Result<CartLine, RepositoryError> {
        let line = sqlx::query_as::<_, CartLine>(
            r"
            UPDATE cart_lines cl
            SET quantity = $3, updated_at = now()
            FROM carts c
            WHERE cl.id = $2
              AND cl.cart_id = c.id
              AND c.user_id = $1
            RETURNING cl.id, cl.cart_id, cl.meal_id, cl.quantity, cl.created_at, cl.updated_at
            ",
        )
        .bind(user_id)
        .bind(line_id)
        .bind(quantity)
        .fetch_optional(self.pool)
        .await?;

        line.ok_or(RepositoryError::NotFound)
    }

    /// Remove a cart line owned by the user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line is not in the user's
    /// cart.
    pub async fn remove_line(
        &self,
        user_id: UserId,
        line_id: CartLineId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM cart_lines cl
            USING carts c
            WHERE cl.id = $2
              AND cl.cart_id = c.id
              AND c.user_id = $1
            ",
        )
        .bind(user_id)
        .bind(line_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Remove every line from the user's cart. A no-op if the cart is already
    /// empty or does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn clear(&self, user_id: UserId) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            DELETE FROM cart_lines cl
            USING carts c
            WHERE cl.cart_id = c.id
              AND c.user_id = $1
            ",
        )
        .bind(user_id)
        .execute(self.pool)
        .await?;

        Ok(())
    }
}
