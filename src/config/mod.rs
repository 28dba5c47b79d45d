//! Application configuration
//!
//! Typed configuration loaded from environment variables with the `config`
//! and `dotenvy` crates. Variables use the `LINGOLEAP` prefix and `__` between
//! nested keys.
//!
//! # Example
//!
//! ```no_run
//! use lingoleap::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod database;
mod error;
mod payment;
mod server;
mod spaced_repetition;
mod webhook;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use payment::PaymentConfig;
pub use server::{Environment, ServerConfig};
pub use spaced_repetition::SpacedRepetitionConfig;
pub use webhook::WebhookConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    pub database: DatabaseConfig,

    /// PayOS credentials
    pub payment: PaymentConfig,

    /// Queue retry and sweep settings
    #[serde(default)]
    pub webhook: WebhookConfig,

    #[serde(default)]
    pub spaced_repetition: SpacedRepetitionConfig,
}

impl AppConfig {
    /// Load configuration from the environment
    ///
    /// Reads `.env` when present, then variables such as
    /// `LINGOLEAP__DATABASE__URL` (`database.url`) or
    /// `LINGOLEAP__WEBHOOK__MAX_RETRIES` (`webhook.max_retries`).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or a value
    /// cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("LINGOLEAP")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Semantic validation of every section
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.payment.validate(self.is_production())?;
        self.webhook.validate()?;
        self.spaced_repetition.validate()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::webhook::SignatureFailurePolicy;
    use std::env;
    use std::sync::Mutex;

    // env vars are process-global
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "LINGOLEAP__DATABASE__URL",
        "LINGOLEAP__PAYMENT__PAYOS_CLIENT_ID",
        "LINGOLEAP__PAYMENT__PAYOS_API_KEY",
        "LINGOLEAP__PAYMENT__PAYOS_CHECKSUM_KEY",
        "LINGOLEAP__SERVER__PORT",
        "LINGOLEAP__SERVER__ENVIRONMENT",
        "LINGOLEAP__WEBHOOK__MAX_RETRIES",
        "LINGOLEAP__WEBHOOK__SIGNATURE_FAILURE_POLICY",
        "LINGOLEAP__SPACED_REPETITION__DEMO",
    ];

    fn set_minimal_env() {
        env::set_var("LINGOLEAP__DATABASE__URL", "postgresql://test@localhost/lingoleap");
        env::set_var("LINGOLEAP__PAYMENT__PAYOS_CLIENT_ID", "client-id");
        env::set_var("LINGOLEAP__PAYMENT__PAYOS_API_KEY", "api-key");
        env::set_var("LINGOLEAP__PAYMENT__PAYOS_CHECKSUM_KEY", "checksum-key");
    }

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    fn load_with(extra: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        set_minimal_env();
        for (key, value) in extra {
            env::set_var(key, value);
        }
        let result = AppConfig::load();
        clear_env();
        result
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let config = load_with(&[]).unwrap();

        assert_eq!(config.database.url, "postgresql://test@localhost/lingoleap");
        assert_eq!(config.payment.payos_client_id, "client-id");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.webhook.max_retries, 5);
        assert!(!config.spaced_repetition.demo);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_webhook_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let config = load_with(&[
            ("LINGOLEAP__WEBHOOK__MAX_RETRIES", "2"),
            ("LINGOLEAP__WEBHOOK__SIGNATURE_FAILURE_POLICY", "retry"),
        ])
        .unwrap();

        assert_eq!(config.webhook.max_retries, 2);
        assert_eq!(
            config.webhook.signature_failure_policy,
            SignatureFailurePolicy::Retry
        );
    }

    #[test]
    fn test_demo_scheduling() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let config = load_with(&[("LINGOLEAP__SPACED_REPETITION__DEMO", "true")]).unwrap();

        assert_eq!(
            config.spaced_repetition.scheduling_policy().mastery_interval_days,
            1
        );
    }

    #[test]
    fn test_is_production() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let config = load_with(&[("LINGOLEAP__SERVER__ENVIRONMENT", "production")]).unwrap();

        assert!(config.is_production());
        // default PayOS endpoint is HTTPS
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_checksum_key_fails_to_load() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("LINGOLEAP__DATABASE__URL", "postgresql://test@localhost/lingoleap");
        env::set_var("LINGOLEAP__PAYMENT__PAYOS_CLIENT_ID", "client-id");
        env::set_var("LINGOLEAP__PAYMENT__PAYOS_API_KEY", "api-key");
        let result = AppConfig::load();
        clear_env();

        assert!(matches!(result, Err(ConfigError::LoadError(_))));
    }
}
