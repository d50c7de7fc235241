//! Cart route handlers.
//!
//! Cart totals are computed against *current* catalog prices on every read;
//! nothing monetary is stored on the cart itself.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use mealbridge_core::pricing::{self, Totals};
use mealbridge_core::{CartId, CartLineId, MealId};

use crate::db::{CartRepository, MealRepository};
use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::{CartLine, CartLineView};
use crate::state::AppState;

/// Cart response with live-priced lines and totals.
#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub id: CartId,
    pub lines: Vec<CartLineView>,
    #[serde(flatten)]
    pub totals: Totals,
}

/// Request body for adding a meal to the cart.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub meal_id: MealId,
    pub quantity: i32,
}

/// Request body for updating a cart line.
#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: i32,
}

fn validate_quantity(quantity: i32) -> Result<()> {
    if quantity <= 0 {
        return Err(AppError::Validation(
            "quantity must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

/// Cart page handler: the cart with its lines and live totals.
pub async fn show(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<CartResponse>> {
    let repo = CartRepository::new(state.pool());
    let cart = repo.get_or_create(user.id).await?;
    let lines = repo.lines(user.id).await?;

    let totals = pricing::compute_totals(
        lines
            .iter()
            .map(|l| (l.unit_price, u32::try_from(l.quantity).unwrap_or(0))),
        state.config().tax_rate,
    );

    Ok(Json(CartResponse {
        id: cart.id,
        lines,
        totals,
    }))
}

/// Add a meal to the cart, merging into an existing line for the same meal.
pub async fn add_item(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<CartLine>)> {
    validate_quantity(body.quantity)?;

    // Catalog availability is a caller-side check; the cart store itself
    // only cares that the meal exists.
    let meal = MealRepository::new(state.pool())
        .get(body.meal_id)
        .await?
        .ok_or_else(|| AppError::NotFound("meal".to_string()))?;
    if !meal.is_available {
        return Err(AppError::Validation(format!(
            "meal '{}' is not currently available",
            meal.name
        )));
    }

    let line = CartRepository::new(state.pool())
        .add_item(user.id, body.meal_id, body.quantity)
        .await?;

    Ok((StatusCode::CREATED, Json(line)))
}

/// Set the quantity of a cart line.
pub async fn update_item(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(line_id): Path<CartLineId>,
    Json(body): Json<UpdateItemRequest>,
) -> Result<Json<CartLine>> {
    validate_quantity(body.quantity)?;

    let line = CartRepository::new(state.pool())
        .update_line(user.id, line_id, body.quantity)
        .await?;

    Ok(Json(line))
}

/// Remove a cart line.
pub async fn remove_item(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(line_id): Path<CartLineId>,
) -> Result<StatusCode> {
    CartRepository::new(state.pool())
        .remove_line(user.id, line_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Clear the cart. A no-op (not an error) when already empty.
pub async fn clear(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<StatusCode> {
    CartRepository::new(state.pool()).clear(user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(42).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
    }
}
