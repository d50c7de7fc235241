//! Customer account model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use mealbridge_core::{Email, UserId};

/// A customer account.
///
/// Token issuance and password handling are out of scope for this service;
/// the HTTP layer only resolves bearer tokens to one of these rows.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    /// Grants access to the administrative order endpoints.
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
