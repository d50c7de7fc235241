//! Meal catalog repository.
//!
//! This is the "catalog service" the cart and order paths resolve prices
//! against. Order creation always re-fetches prices here instead of trusting
//! anything stored on the cart.

use rust_decimal::Decimal;
use sqlx::PgPool;

use mealbridge_core::MealId;

use super::RepositoryError;
use crate::models::Meal;

/// Parameters for creating a meal.
#[derive(Debug, Clone)]
pub struct CreateMeal {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub available_month: chrono::NaiveDate,
    pub category: Option<String>,
}

/// Repository for meal catalog operations.
pub struct MealRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MealRepository<'a> {
    /// Create a new meal repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List meals, optionally restricted to currently available ones.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, available_only: bool) -> Result<Vec<Meal>, RepositoryError> {
        let meals = sqlx::query_as::<_, Meal>(
            r"
            SELECT id, name, description, price, image_url,
                   available_month, is_available, category, created_at, updated_at
            FROM meals
            WHERE is_available OR NOT $1
            ORDER BY available_month DESC, name
            ",
        )
        .bind(available_only)
        .fetch_all(self.pool)
        .await?;

        Ok(meals)
    }

    /// Get a meal by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: MealId) -> Result<Option<Meal>, RepositoryError> {
        let meal = sqlx::query_as::<_, Meal>(
            r"
            SELECT id, name, description, price, image_url,
                   available_month, is_available, category, created_at, updated_at
            FROM meals
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(meal)
    }

    /// Insert a new meal into the catalog.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, params: CreateMeal) -> Result<Meal, RepositoryError> {
        let meal = sqlx::query_as::<_, Meal>(
            r"
            INSERT INTO meals (id, name, description, price, image_url, available_month, category)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, name, description, price, image_url,
                      available_month, is_available, category, created_at, updated_at
            ",
        )
        .bind(MealId::generate())
        .bind(params.name)
        .bind(params.description)
        .bind(params.price)
        .bind(params.image_url)
        .bind(params.available_month)
        .bind(params.category)
        .fetch_one(self.pool)
        .await?;

        Ok(meal)
    }

    /// Update a meal's catalog price.
    ///
    /// Existing orders are unaffected; they carry their own
    /// `price_at_purchase`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the meal does not exist.
    pub async fn update_price(&self, id: MealId, price: Decimal) -> Result<Meal, RepositoryError> {
        let meal = sqlx::query_as::<_, Meal>(
            r"
            UPDATE meals
            SET price = $2, updated_at = now()
            WHERE id = $1
            RETURNING id, name, description, price, image_url,
                      available_month, is_available, category, created_at, updated_at
            ",
        )
        .bind(id)
        .bind(price)
        .fetch_optional(self.pool)
        .await?;

        meal.ok_or(RepositoryError::NotFound)
    }
}
