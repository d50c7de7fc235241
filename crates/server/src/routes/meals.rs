//! Menu catalog route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use mealbridge_core::MealId;

use crate::db::MealRepository;
use crate::error::{AppError, Result};
use crate::models::Meal;
use crate::state::AppState;

/// Query parameters for the menu listing.
#[derive(Debug, Deserialize)]
pub struct ListMealsParams {
    /// When true (the default), only currently available meals are returned.
    #[serde(default = "default_available_only")]
    pub available_only: bool,
}

const fn default_available_only() -> bool {
    true
}

/// Menu listing handler.
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<ListMealsParams>,
) -> Result<Json<Vec<Meal>>> {
    let meals = MealRepository::new(state.pool())
        .list(params.available_only)
        .await?;
    Ok(Json(meals))
}

/// Meal detail handler.
pub async fn show(State(state): State<AppState>, Path(id): Path<MealId>) -> Result<Json<Meal>> {
    let meal = MealRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("meal".to_string()))?;
    Ok(Json(meal))
}
