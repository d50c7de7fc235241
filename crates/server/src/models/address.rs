//! Delivery address model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use mealbridge_core::{AddressId, UserId};

/// A delivery address belonging to a user.
///
/// At most one address per user may be the default; the partial unique index
/// on `(user_id) WHERE is_default` backs that up at the storage layer.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Address {
    pub id: AddressId,
    pub user_id: UserId,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub additional_instructions: Option<String>,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
