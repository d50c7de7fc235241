//! Shopping cart models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use mealbridge_core::{CartId, CartLineId, MealId, UserId};

/// A user's pre-order basket. One per user, created lazily; cleared (lines
/// removed, cart row kept) after payment confirmation or an explicit clear.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Cart {
    pub id: CartId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One (meal, quantity) entry in a cart. At most one line per (cart, meal)
/// pair; re-adding a meal increments the existing line.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CartLine {
    pub id: CartLineId,
    pub cart_id: CartId,
    pub meal_id: MealId,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A cart line joined with its meal's *current* catalog price.
///
/// Cart totals always reflect live prices, unlike order lines which freeze
/// the price at purchase time.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CartLineView {
    pub id: CartLineId,
    pub meal_id: MealId,
    pub name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}
