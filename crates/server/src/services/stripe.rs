//! Stripe payment gateway adapter.
//!
//! The rest of the backend needs exactly three things from Stripe: create a
//! payment intent, create a hosted checkout session, and verify incoming
//! webhooks. Everything speaks the form-encoded Stripe REST API via reqwest
//! with a bounded timeout; failures surface as [`GatewayError`] and are never
//! retried automatically, since a blind retry of a financial call risks a
//! double charge.
//!
//! Both intent and session creation put the order id in payment-intent
//! metadata so webhook events can be routed back to the order they settle.

use std::collections::HashMap;

use hmac::{Hmac, Mac};
use reqwest::Client;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;

use mealbridge_core::OrderId;

use crate::config::StripeConfig;

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

/// Webhook timestamps older than this are rejected to blunt replay attacks.
const WEBHOOK_TOLERANCE_SECS: i64 = 300;

/// Event type emitted when a payment intent settles successfully.
pub const EVENT_PAYMENT_SUCCEEDED: &str = "payment_intent.succeeded";
/// Event type emitted when a payment intent fails.
pub const EVENT_PAYMENT_FAILED: &str = "payment_intent.payment_failed";

type HmacSha256 = Hmac<Sha256>;

/// Errors from the payment gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Transport-level failure (timeout, connection, TLS).
    #[error("stripe request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Stripe returned a non-success status.
    #[error("stripe returned {status}: {message}")]
    Api { status: u16, message: String },

    /// Amount cannot be represented as a whole number of cents.
    #[error("amount is not representable in cents: {0}")]
    InvalidAmount(Decimal),

    /// Webhook signature header missing pieces or failing verification.
    #[error("invalid webhook signature")]
    InvalidSignature,

    /// Webhook payload verified but could not be parsed.
    #[error("malformed webhook payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),
}

/// A created payment intent.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    /// Stripe's payment intent id (the external payment reference).
    pub id: String,
    /// Client secret handed to the mobile client to complete payment.
    pub client_secret: String,
}

/// A created hosted checkout session.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    /// Stripe's session id.
    pub id: String,
    /// Hosted payment page the client is redirected to.
    pub url: String,
}

/// A verified webhook event.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    /// Event type, e.g. `payment_intent.succeeded`.
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: WebhookData,
}

/// Payload container inside a webhook event.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookData {
    pub object: WebhookObject,
}

/// The object a webhook event refers to (a payment intent, for the events we
/// handle).
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookObject {
    pub id: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl WebhookObject {
    /// The order id this payment was created for, if the metadata carries one.
    #[must_use]
    pub fn order_id(&self) -> Option<OrderId> {
        self.metadata.get("order_id").and_then(|s| s.parse().ok())
    }
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    message: Option<String>,
}

/// Client for the Stripe REST API.
pub struct StripeGateway {
    client: Client,
    secret_key: SecretString,
    webhook_secret: SecretString,
}

impl StripeGateway {
    /// Create a new gateway from configuration.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Http` if the HTTP client cannot be built.
    pub fn new(config: &StripeConfig) -> Result<Self, GatewayError> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            secret_key: config.secret_key.clone(),
            webhook_secret: config.webhook_secret.clone(),
        })
    }

    /// Create a payment intent for an order.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` on provider failure or an unrepresentable
    /// amount. The caller decides whether to retry; this adapter never does.
    pub async fn create_payment_intent(
        &self,
        order_id: OrderId,
        amount: Decimal,
    ) -> Result<PaymentIntent, GatewayError> {
        let cents = to_cents(amount)?;
        let order_id = order_id.to_string();
        let cents_str = cents.to_string();

        let params: Vec<(&str, &str)> = vec![
            ("amount", &cents_str),
            ("currency", "usd"),
            ("automatic_payment_methods[enabled]", "true"),
            ("metadata[order_id]", &order_id),
        ];

        self.post_form("/payment_intents", &params).await
    }

    /// Create a hosted checkout session for an order.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` on provider failure or an unrepresentable
    /// amount.
    pub async fn create_checkout_session(
        &self,
        order_id: OrderId,
        amount: Decimal,
        success_url: &str,
        cancel_url: &str,
    ) -> Result<CheckoutSession, GatewayError> {
        let cents = to_cents(amount)?;
        let order_id = order_id.to_string();
        let cents_str = cents.to_string();
        let description = format!("Order #{order_id}");

        let params =
            checkout_session_params(&order_id, &cents_str, &description, success_url, cancel_url);

        self.post_form("/checkout/sessions", &params).await
    }

    /// Verify and parse an incoming webhook.
    ///
    /// An unverifiable webhook is a security failure: the payload is never
    /// parsed, let alone processed. Delivery may be duplicated or reordered;
    /// the idempotent confirmation path downstream compensates.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::InvalidSignature` if the signature header is
    /// malformed, stale, or does not match.
    pub fn verify_webhook(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<WebhookEvent, GatewayError> {
        verify_and_parse(
            self.webhook_secret.expose_secret(),
            payload,
            signature_header,
            chrono::Utc::now().timestamp(),
        )
    }

    async fn post_form<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, GatewayError> {
        let response = self
            .client
            .post(format!("{STRIPE_API_BASE}{path}"))
            .bearer_auth(self.secret_key.expose_secret())
            .form(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<StripeErrorBody>()
                .await
                .ok()
                .and_then(|b| b.error.message)
                .unwrap_or_else(|| "unknown error".to_string());
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<T>().await?)
    }
}

/// Build the form parameters for a hosted checkout session.
///
/// Stripe does not copy session metadata onto the payment intent it creates,
/// so the order id goes in two places: `metadata` on the session itself and
/// `payment_intent_data[metadata]` on the intent, whose
/// `payment_intent.succeeded` event is what settles the order.
fn checkout_session_params<'a>(
    order_id: &'a str,
    cents: &'a str,
    description: &'a str,
    success_url: &'a str,
    cancel_url: &'a str,
) -> Vec<(&'static str, &'a str)> {
    vec![
        ("mode", "payment"),
        ("payment_method_types[0]", "card"),
        ("line_items[0][price_data][currency]", "usd"),
        ("line_items[0][price_data][product_data][name]", "Food Order"),
        (
            "line_items[0][price_data][product_data][description]",
            description,
        ),
        ("line_items[0][price_data][unit_amount]", cents),
        ("line_items[0][quantity]", "1"),
        ("success_url", success_url),
        ("cancel_url", cancel_url),
        ("metadata[order_id]", order_id),
        ("payment_intent_data[metadata][order_id]", order_id),
    ]
}

/// Convert a 2-decimal dollar amount to whole cents.
fn to_cents(amount: Decimal) -> Result<i64, GatewayError> {
    let scaled = amount * Decimal::ONE_HUNDRED;
    if !scaled.fract().is_zero() {
        return Err(GatewayError::InvalidAmount(amount));
    }
    scaled.to_i64().ok_or(GatewayError::InvalidAmount(amount))
}

/// Verify a `Stripe-Signature` header against the raw payload, then parse.
///
/// The header carries `t=<unix ts>,v1=<hex hmac>[,v1=...]`; the signed string
/// is `"{t}.{payload}"`. Comparison is constant-time via `Mac::verify_slice`.
fn verify_and_parse(
    secret: &str,
    payload: &[u8],
    signature_header: &str,
    now: i64,
) -> Result<WebhookEvent, GatewayError> {
    let mut timestamp: Option<i64> = None;
    let mut candidates: Vec<Vec<u8>> = Vec::new();

    for part in signature_header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse().ok(),
            Some(("v1", value)) => {
                if let Ok(sig) = hex::decode(value) {
                    candidates.push(sig);
                }
            }
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(GatewayError::InvalidSignature)?;
    if candidates.is_empty() || (now - timestamp).abs() > WEBHOOK_TOLERANCE_SECS {
        return Err(GatewayError::InvalidSignature);
    }

    let verified = candidates.iter().any(|candidate| {
        let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
            return false;
        };
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        mac.verify_slice(candidate).is_ok()
    });

    if !verified {
        return Err(GatewayError::InvalidSignature);
    }

    Ok(serde_json::from_slice(payload)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_secret_value";

    fn sign(payload: &[u8], timestamp: i64) -> String {
        let mut mac = HmacSha256::new_from_slice(SECRET.as_bytes()).unwrap();
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }

    fn event_json(order_id: &str) -> String {
        format!(
            r#"{{"type":"payment_intent.succeeded","data":{{"object":{{"id":"pi_123","metadata":{{"order_id":"{order_id}"}}}}}}}}"#
        )
    }

    #[test]
    fn test_verify_valid_signature() {
        let order_id = OrderId::generate();
        let payload = event_json(&order_id.to_string());
        let now = 1_700_000_000;
        let header = format!("t={now},v1={}", sign(payload.as_bytes(), now));

        let event = verify_and_parse(SECRET, payload.as_bytes(), &header, now).unwrap();
        assert_eq!(event.event_type, EVENT_PAYMENT_SUCCEEDED);
        assert_eq!(event.data.object.id, "pi_123");
        assert_eq!(event.data.object.order_id(), Some(order_id));
    }

    #[test]
    fn test_verify_rejects_tampered_payload() {
        let payload = event_json(&OrderId::generate().to_string());
        let now = 1_700_000_000;
        let header = format!("t={now},v1={}", sign(payload.as_bytes(), now));

        let tampered = payload.replace("pi_123", "pi_999");
        let result = verify_and_parse(SECRET, tampered.as_bytes(), &header, now);
        assert!(matches!(result, Err(GatewayError::InvalidSignature)));
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let payload = event_json(&OrderId::generate().to_string());
        let now = 1_700_000_000;
        let header = format!("t={now},v1={}", sign(payload.as_bytes(), now));

        let result = verify_and_parse("whsec_other", payload.as_bytes(), &header, now);
        assert!(matches!(result, Err(GatewayError::InvalidSignature)));
    }

    #[test]
    fn test_verify_rejects_stale_timestamp() {
        let payload = event_json(&OrderId::generate().to_string());
        let signed_at = 1_700_000_000;
        let header = format!("t={signed_at},v1={}", sign(payload.as_bytes(), signed_at));

        let now = signed_at + WEBHOOK_TOLERANCE_SECS + 1;
        let result = verify_and_parse(SECRET, payload.as_bytes(), &header, now);
        assert!(matches!(result, Err(GatewayError::InvalidSignature)));
    }

    #[test]
    fn test_verify_rejects_malformed_header() {
        let payload = event_json(&OrderId::generate().to_string());
        for header in ["", "t=abc", "v1=deadbeef", "t=123"] {
            let result = verify_and_parse(SECRET, payload.as_bytes(), header, 123);
            assert!(matches!(result, Err(GatewayError::InvalidSignature)));
        }
    }

    #[test]
    fn test_verify_accepts_any_matching_v1() {
        let payload = event_json(&OrderId::generate().to_string());
        let now = 1_700_000_000;
        let good = sign(payload.as_bytes(), now);
        let header = format!("t={now},v1={},v1={good}", hex::encode([0u8; 32]));

        assert!(verify_and_parse(SECRET, payload.as_bytes(), &header, now).is_ok());
    }

    #[test]
    fn test_missing_order_id_metadata() {
        let payload = r#"{"type":"payment_intent.succeeded","data":{"object":{"id":"pi_1"}}}"#;
        let now = 1_700_000_000;
        let header = format!("t={now},v1={}", sign(payload.as_bytes(), now));

        let event = verify_and_parse(SECRET, payload.as_bytes(), &header, now).unwrap();
        assert_eq!(event.data.object.order_id(), None);
    }

    #[test]
    fn test_checkout_session_stamps_order_id_on_intent() {
        let order_id = OrderId::generate().to_string();
        let params = checkout_session_params(
            &order_id,
            "3885",
            "Order #x",
            "https://example.test/ok",
            "https://example.test/cancel",
        );

        // The webhook we consume fires on the payment intent, not the
        // session, so the intent must carry the order id itself.
        assert!(params.contains(&("metadata[order_id]", order_id.as_str())));
        assert!(params.contains(&("payment_intent_data[metadata][order_id]", order_id.as_str())));
    }

    #[test]
    fn test_to_cents() {
        assert_eq!(to_cents("38.85".parse().unwrap()).unwrap(), 3885);
        assert_eq!(to_cents("0.00".parse().unwrap()).unwrap(), 0);
        assert!(matches!(
            to_cents("1.005".parse().unwrap()),
            Err(GatewayError::InvalidAmount(_))
        ));
    }
}
