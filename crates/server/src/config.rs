//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `MEALBRIDGE_DATABASE_URL` - `PostgreSQL` connection string
//! - `STRIPE_SECRET_KEY` - Stripe API secret key
//! - `STRIPE_WEBHOOK_SECRET` - Stripe webhook signing secret
//!
//! ## Optional
//! - `MEALBRIDGE_HOST` - Bind address (default: 127.0.0.1)
//! - `MEALBRIDGE_PORT` - Listen port (default: 8000)
//! - `MEALBRIDGE_TAX_RATE` - Sales tax rate (default: 0.08)
//! - `STRIPE_TIMEOUT_SECS` - Stripe request timeout (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;

const MIN_SECRET_LENGTH: usize = 16;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &["your-", "changeme", "replace", "placeholder", "example"];

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnv(String),

    /// An environment variable has an unparseable value.
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),

    /// A secret looks like a placeholder or is too short to be real.
    #[error("insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Stripe gateway configuration.
#[derive(Debug, Clone)]
pub struct StripeConfig {
    /// API secret key used as bearer auth against the Stripe API.
    pub secret_key: SecretString,
    /// Webhook signing secret for `Stripe-Signature` verification.
    pub webhook_secret: SecretString,
    /// Bounded timeout for every Stripe API call.
    pub timeout: Duration,
}

/// Top-level server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` connection string.
    pub database_url: SecretString,
    /// Bind address.
    pub host: IpAddr,
    /// Listen port.
    pub port: u16,
    /// Sales tax rate applied when pricing carts and orders.
    pub tax_rate: Decimal,
    /// Stripe gateway settings.
    pub stripe: StripeConfig,
    /// Sentry DSN, if error tracking is enabled.
    pub sentry_dsn: Option<String>,
    /// Sentry environment name.
    pub sentry_environment: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing, a value cannot
    /// be parsed, or a secret fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = SecretString::from(get_required_env("MEALBRIDGE_DATABASE_URL")?);

        let host_raw = get_env_or_default("MEALBRIDGE_HOST", "127.0.0.1");
        let host: IpAddr = host_raw
            .parse()
            .map_err(|_| ConfigError::Invalid("MEALBRIDGE_HOST".into(), host_raw.clone()))?;

        let port_raw = get_env_or_default("MEALBRIDGE_PORT", "8000");
        let port: u16 = port_raw
            .parse()
            .map_err(|_| ConfigError::Invalid("MEALBRIDGE_PORT".into(), port_raw.clone()))?;

        let tax_raw = get_env_or_default("MEALBRIDGE_TAX_RATE", "0.08");
        let tax_rate: Decimal = tax_raw
            .parse()
            .map_err(|_| ConfigError::Invalid("MEALBRIDGE_TAX_RATE".into(), tax_raw.clone()))?;
        if tax_rate.is_sign_negative() {
            return Err(ConfigError::Invalid("MEALBRIDGE_TAX_RATE".into(), tax_raw));
        }

        let stripe = StripeConfig {
            secret_key: get_validated_secret("STRIPE_SECRET_KEY")?,
            webhook_secret: get_validated_secret("STRIPE_WEBHOOK_SECRET")?,
            timeout: Duration::from_secs(parse_env_or_default("STRIPE_TIMEOUT_SECS", 10)?),
        };

        Ok(Self {
            database_url,
            host,
            port,
            tax_rate,
            stripe,
            sentry_dsn: std::env::var("SENTRY_DSN").ok(),
            sentry_environment: std::env::var("SENTRY_ENVIRONMENT").ok(),
        })
    }

    /// The socket address to bind the listener to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnv(key.to_string()))
}

fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env_or_default(key: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ConfigError::Invalid(key.to_string(), raw)),
        Err(_) => Ok(default),
    }
}

/// Validate that a secret is not a placeholder and has a plausible length.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    if secret.len() < MIN_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {MIN_SECRET_LENGTH} characters (got {})",
                secret.len()
            ),
        ));
    }

    let lower = secret.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-stripe-key-here", "TEST_VAR");
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InsecureSecret(_, _)
        ));
    }

    #[test]
    fn test_validate_secret_strength_too_short() {
        let result = validate_secret_strength("sk_test_1", "TEST_VAR");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("sk_test_4eC39HqLyjWDarjtT1zdp7dc", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let config = ServerConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 8000,
            tax_rate: mealbridge_core::pricing::DEFAULT_TAX_RATE,
            stripe: StripeConfig {
                secret_key: SecretString::from("sk_test_4eC39HqLyjWDarjtT1zdp7dc"),
                webhook_secret: SecretString::from("whsec_4eC39HqLyjWDarjtT1zdp7dc"),
                timeout: Duration::from_secs(10),
            },
            sentry_dsn: None,
            sentry_environment: None,
        };
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8000");
    }
}
