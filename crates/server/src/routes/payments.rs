//! Payment route handlers.
//!
//! Gateway calls happen outside any database transaction: the order is read
//! first, the Stripe call runs on its own, and status updates take their own
//! short transaction afterwards. A gateway timeout therefore leaves the order
//! Pending and lets the caller retry explicitly.

use axum::{Json, body::Bytes, extract::State, http::HeaderMap};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, warn};

use mealbridge_core::{OrderId, PaymentStatus};

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::{Order, User};
use crate::services::OrderService;
use crate::services::stripe::{EVENT_PAYMENT_FAILED, EVENT_PAYMENT_SUCCEEDED};
use crate::state::AppState;

/// Request body naming the order to pay for.
#[derive(Debug, Deserialize)]
pub struct CreateIntentRequest {
    pub order_id: OrderId,
}

/// Response for a created payment intent.
#[derive(Debug, Serialize)]
pub struct IntentResponse {
    pub client_secret: String,
    pub payment_intent_id: String,
    pub amount: Decimal,
}

/// Request body for a hosted checkout session.
#[derive(Debug, Deserialize)]
pub struct CheckoutSessionRequest {
    pub order_id: OrderId,
    pub success_url: String,
    pub cancel_url: String,
}

/// Response for a created checkout session.
#[derive(Debug, Serialize)]
pub struct CheckoutSessionResponse {
    pub session_id: String,
    pub url: String,
}

/// Request body for the explicit payment confirmation endpoint.
#[derive(Debug, Deserialize)]
pub struct ConfirmPaymentRequest {
    pub order_id: OrderId,
    pub payment_intent_id: String,
}

/// Load one of the caller's payable orders, rejecting ones already paid.
async fn payable_order(state: &AppState, user: &User, order_id: OrderId) -> Result<Order> {
    let order = OrderRepository::new(state.pool())
        .get(order_id, Some(user.id))
        .await?
        .ok_or_else(|| AppError::NotFound("order".to_string()))?;

    if order.payment_status == PaymentStatus::Completed {
        return Err(AppError::Validation("order is already paid".to_string()));
    }
    Ok(order)
}

/// Create a Stripe payment intent for an order.
pub async fn create_intent(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<CreateIntentRequest>,
) -> Result<Json<IntentResponse>> {
    let order = payable_order(&state, &user, body.order_id).await?;

    let intent = state
        .gateway()
        .create_payment_intent(order.id, order.total_price)
        .await?;

    Ok(Json(IntentResponse {
        client_secret: intent.client_secret,
        payment_intent_id: intent.id,
        amount: order.total_price,
    }))
}

/// Create a hosted Stripe checkout session for an order.
pub async fn create_checkout_session(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<CheckoutSessionRequest>,
) -> Result<Json<CheckoutSessionResponse>> {
    let order = payable_order(&state, &user, body.order_id).await?;

    let session = state
        .gateway()
        .create_checkout_session(
            order.id,
            order.total_price,
            &body.success_url,
            &body.cancel_url,
        )
        .await?;

    Ok(Json(CheckoutSessionResponse {
        session_id: session.id,
        url: session.url,
    }))
}

/// Explicitly confirm payment for one of the caller's orders.
///
/// Shares the idempotent confirmation path with the webhook; confirming an
/// already-confirmed order succeeds without re-running side effects.
pub async fn confirm(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<ConfirmPaymentRequest>,
) -> Result<Json<Order>> {
    // Ownership check first so one account cannot confirm another's order.
    OrderRepository::new(state.pool())
        .get(body.order_id, Some(user.id))
        .await?
        .ok_or_else(|| AppError::NotFound("order".to_string()))?;

    let order = OrderService::new(state.pool(), state.config().tax_rate)
        .confirm_payment(body.order_id, &body.payment_intent_id)
        .await?;

    Ok(Json(order))
}

/// Stripe webhook receiver.
///
/// The raw body is verified against the `Stripe-Signature` header before any
/// parsing; an unverifiable delivery is rejected with 400. Verified events
/// are routed by the order id carried in the payment intent's metadata to the
/// same idempotent confirmation path as the explicit endpoint, so duplicate
/// deliveries are harmless.
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Validation("missing Stripe-Signature header".to_string()))?;

    let event = state.gateway().verify_webhook(&body, signature)?;

    let object = &event.data.object;
    match event.event_type.as_str() {
        EVENT_PAYMENT_SUCCEEDED => {
            if let Some(order_id) = object.order_id() {
                settle(&state, order_id, &object.id, true).await?;
            } else {
                warn!(payment_intent = %object.id, "succeeded event without order_id metadata");
            }
        }
        EVENT_PAYMENT_FAILED => {
            if let Some(order_id) = object.order_id() {
                settle(&state, order_id, &object.id, false).await?;
            } else {
                warn!(payment_intent = %object.id, "failed event without order_id metadata");
            }
        }
        other => {
            debug!(event_type = other, "ignoring unhandled webhook event");
        }
    }

    Ok(Json(json!({ "received": true })))
}

/// Apply a settlement event to an order.
///
/// An unknown order id is acknowledged rather than erroring: Stripe would
/// otherwise retry a delivery we can never process.
async fn settle(
    state: &AppState,
    order_id: OrderId,
    external_ref: &str,
    succeeded: bool,
) -> Result<()> {
    let service = OrderService::new(state.pool(), state.config().tax_rate);
    let result = if succeeded {
        service.confirm_payment(order_id, external_ref).await
    } else {
        service.mark_payment_failed(order_id).await
    };

    match result {
        Ok(_) => Ok(()),
        Err(crate::services::OrderError::NotFound) => {
            warn!(%order_id, external_ref, "webhook referenced unknown order, acknowledging");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
