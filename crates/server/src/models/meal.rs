//! Menu catalog model.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use mealbridge_core::MealId;

/// A purchasable menu entry with a current price and availability flag.
///
/// Orders never reference this price after creation; each order line captures
/// `price_at_purchase` at conversion time.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Meal {
    pub id: MealId,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image_url: Option<String>,
    /// Month this meal appears on the menu.
    pub available_month: NaiveDate,
    pub is_available: bool,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
