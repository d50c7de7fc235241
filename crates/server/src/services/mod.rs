//! Domain services.
//!
//! - [`orders`] - the cart-to-order transaction and payment state machine
//! - [`stripe`] - payment gateway adapter (intents, checkout sessions, webhooks)

pub mod orders;
pub mod stripe;

pub use orders::{OrderError, OrderService};
pub use stripe::{GatewayError, StripeGateway};
