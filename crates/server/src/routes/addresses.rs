//! Delivery address route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use mealbridge_core::AddressId;

use crate::db::AddressRepository;
use crate::db::addresses::CreateAddress;
use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::Address;
use crate::state::AppState;

/// Request body for creating an address.
#[derive(Debug, Deserialize)]
pub struct CreateAddressRequest {
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    #[serde(default = "default_country")]
    pub country: String,
    pub additional_instructions: Option<String>,
    #[serde(default)]
    pub is_default: bool,
}

fn default_country() -> String {
    "USA".to_string()
}

/// List the caller's addresses.
pub async fn index(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<Address>>> {
    let addresses = AddressRepository::new(state.pool()).list(user.id).await?;
    Ok(Json(addresses))
}

/// Create a delivery address.
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<CreateAddressRequest>,
) -> Result<(StatusCode, Json<Address>)> {
    if body.street_address.trim().is_empty() || body.city.trim().is_empty() {
        return Err(AppError::Validation(
            "street_address and city are required".to_string(),
        ));
    }

    let address = AddressRepository::new(state.pool())
        .create(
            user.id,
            CreateAddress {
                street_address: body.street_address,
                city: body.city,
                state: body.state,
                postal_code: body.postal_code,
                country: body.country,
                additional_instructions: body.additional_instructions,
                is_default: body.is_default,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(address)))
}

/// Delete one of the caller's addresses.
pub async fn remove(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<AddressId>,
) -> Result<StatusCode> {
    AddressRepository::new(state.pool())
        .delete(user.id, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
