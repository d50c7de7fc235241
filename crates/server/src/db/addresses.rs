//! Delivery address repository.

use sqlx::PgPool;

use mealbridge_core::{AddressId, UserId};

use super::RepositoryError;
use crate::models::Address;

/// Parameters for creating an address.
#[derive(Debug, Clone)]
pub struct CreateAddress {
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub additional_instructions: Option<String>,
    pub is_default: bool,
}

/// Repository for delivery address operations.
pub struct AddressRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AddressRepository<'a> {
    /// Create a new address repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create an address for the user.
    ///
    /// When `is_default` is set, any previous default is demoted in the same
    /// transaction. The partial unique index on `(user_id) WHERE is_default`
    /// turns a lost race between two concurrent defaults into a `Conflict`
    /// instead of two defaults.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` on a duplicate-default race and
    /// `RepositoryError::Database` for other failures.
    pub async fn create(
        &self,
        user_id: UserId,
        params: CreateAddress,
    ) -> Result<Address, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        if params.is_default {
            sqlx::query(
                r"
                UPDATE addresses SET is_default = false, updated_at = now()
                WHERE user_id = $1 AND is_default
                ",
            )
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        }

        let address = sqlx::query_as::<_, Address>(
            r"
            INSERT INTO addresses (
                id, user_id, street_address, city, state, postal_code,
                country, additional_instructions, is_default
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, user_id, street_address, city, state, postal_code,
                      country, additional_instructions, is_default, created_at, updated_at
            ",
        )
        .bind(AddressId::generate())
        .bind(user_id)
        .bind(params.street_address)
        .bind(params.city)
        .bind(params.state)
        .bind(params.postal_code)
        .bind(params.country)
        .bind(params.additional_instructions)
        .bind(params.is_default)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict(
                    "another default address was set concurrently".to_owned(),
                );
            }
            RepositoryError::Database(e)
        })?;

        tx.commit().await?;

        Ok(address)
    }

    /// List the user's addresses, default first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<Address>, RepositoryError> {
        let addresses = sqlx::query_as::<_, Address>(
            r"
            SELECT id, user_id, street_address, city, state, postal_code,
                   country, additional_instructions, is_default, created_at, updated_at
            FROM addresses
            WHERE user_id = $1
            ORDER BY is_default DESC, created_at
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(addresses)
    }

    /// Delete one of the user's addresses.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address does not exist or
    /// belongs to another user, and `RepositoryError::Conflict` if an order
    /// still references it.
    pub async fn delete(&self, user_id: UserId, id: AddressId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM addresses WHERE id = $2 AND user_id = $1")
            .bind(user_id)
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_foreign_key_violation()
                {
                    return RepositoryError::Conflict(
                        "address is referenced by an existing order".to_owned(),
                    );
                }
                RepositoryError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
