//! Order route handlers (customer side).

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use mealbridge_core::{AddressId, OrderId, OrderStatus};

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::{Order, OrderLine};
use crate::services::OrderService;
use crate::state::AppState;

/// Request body for creating an order from the cart.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub delivery_address_id: AddressId,
    pub special_instructions: Option<String>,
}

/// Pagination and filtering for order listings.
#[derive(Debug, Deserialize)]
pub struct ListOrdersParams {
    #[serde(default)]
    pub offset: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub status: Option<OrderStatus>,
}

const fn default_limit() -> i64 {
    20
}

/// An order together with its frozen lines.
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    #[serde(flatten)]
    pub order: Order,
    pub lines: Vec<OrderLine>,
}

/// Convert the caller's cart into an order.
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>)> {
    let placed = OrderService::new(state.pool(), state.config().tax_rate)
        .create_from_cart(user.id, body.delivery_address_id, body.special_instructions)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(OrderResponse {
            order: placed.order,
            lines: placed.lines,
        }),
    ))
}

/// List the caller's orders, newest first.
pub async fn index(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(params): Query<ListOrdersParams>,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool())
        .list(Some(user.id), params.status, params.offset, params.limit)
        .await?;
    Ok(Json(orders))
}

/// Fetch one of the caller's orders with its lines.
///
/// Orders belonging to other accounts are indistinguishable from missing
/// ones.
pub async fn show(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderResponse>> {
    let repo = OrderRepository::new(state.pool());
    let order = repo
        .get(id, Some(user.id))
        .await?
        .ok_or_else(|| AppError::NotFound("order".to_string()))?;
    let lines = repo.lines(order.id).await?;

    Ok(Json(OrderResponse { order, lines }))
}
