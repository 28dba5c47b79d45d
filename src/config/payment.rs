//! PayOS merchant credentials

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::adapters::payos::{PayOsClientConfig, DEFAULT_PAYOS_API_BASE_URL};
use crate::domain::webhook::PayOsSignatureVerifier;

use super::error::ValidationError;

/// Payment gateway configuration (PayOS)
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Merchant client id, sent as `x-client-id`
    pub payos_client_id: String,

    /// Merchant API key, sent as `x-api-key`
    pub payos_api_key: SecretString,

    /// Shared secret for webhook HMAC signatures
    pub payos_checksum_key: SecretString,

    #[serde(default = "default_api_base_url")]
    pub payos_api_base_url: String,
}

impl PaymentConfig {
    pub fn client_config(&self) -> PayOsClientConfig {
        PayOsClientConfig::new(self.payos_client_id.clone(), self.payos_api_key.clone())
            .with_base_url(self.payos_api_base_url.clone())
    }

    pub fn signature_verifier(&self) -> PayOsSignatureVerifier {
        PayOsSignatureVerifier::new(self.payos_checksum_key.expose_secret().clone())
    }

    /// Production gateways must be reached over HTTPS.
    pub fn validate(&self, production: bool) -> Result<(), ValidationError> {
        if self.payos_client_id.trim().is_empty() {
            return Err(ValidationError::MissingRequired(
                "LINGOLEAP__PAYMENT__PAYOS_CLIENT_ID",
            ));
        }
        if self.payos_api_key.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired(
                "LINGOLEAP__PAYMENT__PAYOS_API_KEY",
            ));
        }
        if self.payos_checksum_key.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired(
                "LINGOLEAP__PAYMENT__PAYOS_CHECKSUM_KEY",
            ));
        }
        if production && !self.payos_api_base_url.starts_with("https://") {
            return Err(ValidationError::GatewayUrlMustBeHttps);
        }
        Ok(())
    }
}

fn default_api_base_url() -> String {
    DEFAULT_PAYOS_API_BASE_URL.to_string()
}
