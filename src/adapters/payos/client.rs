//! PayOS payment-request API client.
//!
//! Implements `PaymentGatewayClient` by calling
//! `GET {api_base_url}/v2/payment-requests/{orderCode}` with the merchant's
//! `x-client-id` and `x-api-key` headers.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::webhook::PAYOS_SUCCESS_CODE;
use crate::ports::{GatewayPaymentInfo, GatewayPaymentStatus, PaymentGatewayClient};

/// Production PayOS API endpoint.
pub const DEFAULT_PAYOS_API_BASE_URL: &str = "https://api-merchant.payos.vn";

/// PayOS API credentials.
#[derive(Clone)]
pub struct PayOsClientConfig {
    client_id: String,
    api_key: SecretString,
    api_base_url: String,
}

impl PayOsClientConfig {
    pub fn new(client_id: impl Into<String>, api_key: SecretString) -> Self {
        Self {
            client_id: client_id.into(),
            api_key,
            api_base_url: DEFAULT_PAYOS_API_BASE_URL.to_string(),
        }
    }

    /// Set a custom API base URL (for sandboxes and tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }
}

impl std::fmt::Debug for PayOsClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayOsClientConfig")
            .field("client_id", &self.client_id)
            .field("api_key", &"[REDACTED]")
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

pub struct PayOsClient {
    config: PayOsClientConfig,
    http_client: reqwest::Client,
}

impl PayOsClient {
    pub fn new(config: PayOsClientConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    fn payment_request_url(&self, order_code: i64) -> String {
        format!(
            "{}/v2/payment-requests/{}",
            self.config.api_base_url, order_code
        )
    }
}

#[derive(Debug, Deserialize)]
struct PayOsEnvelope {
    code: String,
    #[serde(default)]
    desc: String,
    data: Option<PayOsPaymentRequest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PayOsPaymentRequest {
    order_code: i64,
    amount: i64,
    #[serde(default)]
    amount_paid: i64,
    #[serde(default)]
    amount_remaining: i64,
    status: String,
    #[serde(default)]
    transactions: Vec<PayOsTransaction>,
}

#[derive(Debug, Deserialize)]
struct PayOsTransaction {
    #[serde(default)]
    reference: Option<String>,
}

impl PayOsEnvelope {
    fn into_payment_info(self, order_code: i64) -> Result<GatewayPaymentInfo, DomainError> {
        if self.code != PAYOS_SUCCESS_CODE {
            return Err(gateway_error(format!(
                "PayOS returned code {} for order {}: {}",
                self.code, order_code, self.desc
            )));
        }

        let data = self
            .data
            .ok_or_else(|| gateway_error(format!("PayOS response for order {} has no data", order_code)))?;

        Ok(GatewayPaymentInfo {
            order_code: data.order_code,
            amount: data.amount,
            amount_paid: data.amount_paid,
            amount_remaining: data.amount_remaining,
            status: GatewayPaymentStatus::parse(&data.status),
            reference: data.transactions.into_iter().find_map(|t| t.reference),
        })
    }
}

fn gateway_error(message: impl Into<String>) -> DomainError {
    DomainError::new(ErrorCode::ExternalServiceError, message)
}

#[async_trait]
impl PaymentGatewayClient for PayOsClient {
    async fn get_payment_info(&self, order_code: i64) -> Result<GatewayPaymentInfo, DomainError> {
        let response = self
            .http_client
            .get(self.payment_request_url(order_code))
            .header("x-client-id", &self.config.client_id)
            .header("x-api-key", self.config.api_key.expose_secret())
            .send()
            .await
            .map_err(|e| gateway_error(format!("PayOS request failed: {}", e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(DomainError::new(
                ErrorCode::NotFound,
                format!("PayOS has no payment request {}", order_code),
            ));
        }

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(gateway_error(format!(
                "PayOS API error ({}): {}",
                status, error_text
            )));
        }

        let envelope: PayOsEnvelope = response
            .json()
            .await
            .map_err(|e| gateway_error(format!("Failed to parse PayOS response: {}", e)))?;

        envelope.into_payment_info(order_code)
    }
}
