//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                    - Liveness check
//! GET    /health/ready              - Readiness check (pings the database)
//!
//! # Menu (public)
//! GET    /meals                     - Menu listing
//! GET    /meals/{id}                - Meal detail
//!
//! # Cart (requires auth)
//! GET    /cart                      - Cart with live-priced totals
//! POST   /cart/items                - Add a meal (merges with existing line)
//! PUT    /cart/items/{id}           - Set a line's quantity
//! DELETE /cart/items/{id}           - Remove a line
//! DELETE /cart                      - Clear the cart
//!
//! # Addresses (requires auth)
//! GET    /addresses                 - List delivery addresses
//! POST   /addresses                 - Create a delivery address
//! DELETE /addresses/{id}            - Delete a delivery address
//!
//! # Orders (requires auth)
//! POST   /orders                    - Convert the cart into an order
//! GET    /orders                    - Caller's orders, newest first
//! GET    /orders/{id}               - One of the caller's orders
//!
//! # Payments (requires auth, except the webhook)
//! POST   /payments/intent           - Create a Stripe payment intent
//! POST   /payments/checkout-session - Create a hosted checkout session
//! POST   /payments/confirm          - Confirm payment (idempotent)
//! POST   /payments/webhook          - Stripe webhook (signature-verified)
//!
//! # Admin (requires admin token)
//! GET    /admin/orders              - All orders, filterable by status
//! PATCH  /admin/orders/{id}/status  - Advance fulfillment status
//! PATCH  /admin/meals/{id}/price    - Update a catalog price
//! DELETE /admin/users/{id}          - Delete an account and its data
//! ```

pub mod addresses;
pub mod admin;
pub mod cart;
pub mod meals;
pub mod orders;
pub mod payments;

use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use crate::state::AppState;

/// Create the meal catalog routes router.
pub fn meal_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(meals::index))
        .route("/{id}", get(meals::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/items", post(cart::add_item))
        .route(
            "/items/{id}",
            axum::routing::put(cart::update_item).delete(cart::remove_item),
        )
}

/// Create the address routes router.
pub fn address_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(addresses::index).post(addresses::create))
        .route("/{id}", delete(addresses::remove))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(orders::create).get(orders::index))
        .route("/{id}", get(orders::show))
}

/// Create the payment routes router.
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/intent", post(payments::create_intent))
        .route("/checkout-session", post(payments::create_checkout_session))
        .route("/confirm", post(payments::confirm))
        .route("/webhook", post(payments::webhook))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(admin::list_orders))
        .route("/orders/{id}/status", patch(admin::update_order_status))
        .route("/meals/{id}/price", patch(admin::update_meal_price))
        .route("/users/{id}", delete(admin::delete_user))
}

/// Assemble all application routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/meals", meal_routes())
        .nest("/cart", cart_routes())
        .nest("/addresses", address_routes())
        .nest("/orders", order_routes())
        .nest("/payments", payment_routes())
        .nest("/admin", admin_routes())
}
