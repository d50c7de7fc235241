//! Order models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use mealbridge_core::{AddressId, MealId, OrderId, OrderLineId, OrderStatus, PaymentStatus, UserId};

/// An immutable-after-creation order snapshot.
///
/// `total_price` is fixed at creation time (tax-inclusive) and never
/// recomputed from current catalog prices. Orders are never deleted, only
/// transitioned through `order_status` and `payment_status`; the two axes are
/// independent.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub delivery_address_id: AddressId,
    pub total_price: Decimal,
    pub payment_status: PaymentStatus,
    pub order_status: OrderStatus,
    /// External payment reference (Stripe payment intent id), set on
    /// confirmation.
    pub stripe_payment_id: Option<String>,
    pub special_instructions: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A frozen (meal, quantity, price-at-purchase) entry belonging to an order.
///
/// Decoupled from the catalog so later price changes never retroactively
/// affect historical orders.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderLine {
    pub id: OrderLineId,
    pub order_id: OrderId,
    pub meal_id: MealId,
    pub quantity: i32,
    pub price_at_purchase: Decimal,
    pub created_at: DateTime<Utc>,
}
