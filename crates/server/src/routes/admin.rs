//! Administrative route handlers.
//!
//! All handlers here require an admin account. Fulfillment transitions are
//! plain administrative actions with no side effects on payment or cart
//! state.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use mealbridge_core::{MealId, OrderId, OrderStatus, UserId};

use crate::db::{MealRepository, OrderRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::middleware::AdminUser;
use crate::models::{Meal, Order};
use crate::routes::orders::ListOrdersParams;
use crate::state::AppState;

/// Request body for a fulfillment status transition.
#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

/// Request body for a catalog price update.
#[derive(Debug, Deserialize)]
pub struct UpdateMealPriceRequest {
    pub price: Decimal,
}

/// List all orders across accounts, filterable by fulfillment status.
pub async fn list_orders(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Query(params): Query<ListOrdersParams>,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool())
        .list(None, params.status, params.offset, params.limit)
        .await?;
    Ok(Json(orders))
}

/// Advance an order's fulfillment status.
pub async fn update_order_status(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<OrderId>,
    Json(body): Json<UpdateOrderStatusRequest>,
) -> Result<Json<Order>> {
    let order = OrderRepository::new(state.pool())
        .update_status(id, body.status)
        .await?;
    Ok(Json(order))
}

/// Update a meal's catalog price.
///
/// Only future carts and orders see the new price; existing orders keep
/// their frozen `price_at_purchase`.
pub async fn update_meal_price(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<MealId>,
    Json(body): Json<UpdateMealPriceRequest>,
) -> Result<Json<Meal>> {
    if body.price.is_sign_negative() {
        return Err(AppError::Validation(
            "price must not be negative".to_string(),
        ));
    }

    let meal = MealRepository::new(state.pool())
        .update_price(id, body.price)
        .await?;
    Ok(Json(meal))
}

/// Delete an account and everything that hangs off it.
pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<UserId>,
) -> Result<StatusCode> {
    UserRepository::new(state.pool()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
