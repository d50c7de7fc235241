//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side failures to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`. Internal detail (SQL errors, gateway bodies) never
//! crosses the trust boundary; clients get a stable status and a generic
//! message.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::orders::OrderError;
use crate::services::stripe::GatewayError;

/// Application-level error type for the server.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database/repository operation failed.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Order transaction failed.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// Payment gateway operation failed.
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Bad input shape or values; the caller's fault, surfaced as-is.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource not found (or not owned by the caller).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error body returned to clients.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl AppError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Repository(err) => match err {
                RepositoryError::NotFound => StatusCode::NOT_FOUND,
                RepositoryError::Conflict(_) => StatusCode::CONFLICT,
                RepositoryError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Order(err) => match err {
                OrderError::EmptyCart | OrderError::AddressNotFound => StatusCode::BAD_REQUEST,
                OrderError::NotFound => StatusCode::NOT_FOUND,
                OrderError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Gateway(err) => match err {
                GatewayError::InvalidSignature | GatewayError::MalformedPayload(_) => {
                    StatusCode::BAD_REQUEST
                }
                GatewayError::InvalidAmount(_) => StatusCode::UNPROCESSABLE_ENTITY,
                GatewayError::Http(_) | GatewayError::Api { .. } => StatusCode::BAD_GATEWAY,
            },
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn is_server_fault(&self) -> bool {
        self.status().is_server_error()
    }

    fn client_message(&self) -> String {
        match self {
            Self::Repository(err) => match err {
                RepositoryError::NotFound => "Not found".to_string(),
                RepositoryError::Conflict(msg) => msg.clone(),
                RepositoryError::Database(_) => "Internal server error".to_string(),
            },
            Self::Order(err) => match err {
                OrderError::EmptyCart => {
                    "Cart is empty. Add items before creating an order.".to_string()
                }
                OrderError::AddressNotFound => "Delivery address not found".to_string(),
                OrderError::NotFound => "Order not found".to_string(),
                OrderError::Database(_) => "Internal server error".to_string(),
            },
            Self::Gateway(err) => match err {
                GatewayError::InvalidSignature => "Invalid webhook signature".to_string(),
                GatewayError::MalformedPayload(_) => "Malformed webhook payload".to_string(),
                GatewayError::InvalidAmount(_) => "Order amount cannot be charged".to_string(),
                GatewayError::Http(_) | GatewayError::Api { .. } => {
                    "Payment provider error, please retry".to_string()
                }
            },
            Self::Validation(msg) => msg.clone(),
            Self::NotFound(what) => format!("Not found: {what}"),
            Self::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server faults to Sentry; client errors are just logged at
        // the request layer.
        if self.is_server_fault() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = ErrorBody {
            error: self.client_message(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::Order(OrderError::EmptyCart).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Repository(RepositoryError::NotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Repository(RepositoryError::Conflict("dup".into())).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Gateway(GatewayError::InvalidSignature).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Validation("bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Internal("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_detail_is_not_leaked() {
        let err = AppError::Internal("connection pool exhausted at 10.0.0.5".into());
        assert_eq!(err.client_message(), "Internal server error");

        let err = AppError::Repository(RepositoryError::Database(sqlx::Error::PoolClosed));
        assert_eq!(err.client_message(), "Internal server error");
    }

    #[test]
    fn test_empty_cart_message() {
        let err = AppError::Order(OrderError::EmptyCart);
        assert_eq!(
            err.client_message(),
            "Cart is empty. Add items before creating an order."
        );
    }

    #[test]
    fn test_gateway_failures_are_bad_gateway() {
        let err = AppError::Gateway(GatewayError::Api {
            status: 500,
            message: "stripe internal".into(),
        });
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.client_message(), "Payment provider error, please retry");
    }
}
