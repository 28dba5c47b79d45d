//! PayOS payload types.
//!
//! Covers the webhook body PayOS posts after a transfer and the query string
//! it appends when redirecting the learner back to the return URL.

use serde::{Deserialize, Serialize};

/// Gateway code meaning "success" at both envelope and transaction level.
pub const PAYOS_SUCCESS_CODE: &str = "00";

/// Webhook body posted by PayOS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayOsWebhook {
    pub code: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub success: bool,
    pub data: PayOsWebhookData,
    #[serde(default)]
    pub signature: Option<String>,
}

/// Transaction details inside a PayOS webhook. This is the signed part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayOsWebhookData {
    pub order_code: i64,
    pub amount: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub account_number: Option<String>,
    /// Bank transfer reference.
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub transaction_date_time: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub payment_link_id: Option<String>,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub counter_account_bank_id: Option<String>,
    #[serde(default)]
    pub counter_account_bank_name: Option<String>,
    #[serde(default)]
    pub counter_account_name: Option<String>,
    #[serde(default)]
    pub counter_account_number: Option<String>,
    #[serde(default)]
    pub virtual_account_name: Option<String>,
    #[serde(default)]
    pub virtual_account_number: Option<String>,
}

impl PayOsWebhook {
    /// True when both the envelope and the transaction report success.
    pub fn is_paid(&self) -> bool {
        self.code == PAYOS_SUCCESS_CODE && self.data.code == PAYOS_SUCCESS_CODE
    }

    pub fn order_code(&self) -> i64 {
        self.data.order_code
    }

    /// Human-readable reason for a non-paid event.
    pub fn failure_reason(&self) -> String {
        let desc = if self.data.desc.is_empty() {
            &self.desc
        } else {
            &self.data.desc
        };
        format!("gateway code {}: {}", self.data.code, desc)
    }
}

/// Query parameters PayOS appends to the return URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnCallback {
    pub code: String,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub data: Option<String>,
    /// Payment link id.
    #[serde(default)]
    pub id: Option<String>,
    pub order_code: i64,
    #[serde(default)]
    pub cancel: Option<bool>,
    /// Gateway status string, e.g. `PAID` or `CANCELLED`.
    #[serde(default)]
    pub status: Option<String>,
}

impl ReturnCallback {
    /// True when the client claims the payment went through.
    pub fn claims_success(&self) -> bool {
        self.code == PAYOS_SUCCESS_CODE
            && self.cancel != Some(true)
            && self
                .status
                .as_deref()
                .map_or(true, |status| status.eq_ignore_ascii_case("PAID"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAID_BODY: &str = r#"{
        "code": "00",
        "desc": "success",
        "success": true,
        "data": {
            "orderCode": 123,
            "amount": 3000,
            "description": "VQRIO123",
            "accountNumber": "12345678",
            "reference": "TF230204212323",
            "transactionDateTime": "2023-02-04 18:25:00",
            "currency": "VND",
            "paymentLinkId": "124c33293c43417ab7879e14c8d9eb18",
            "code": "00",
            "desc": "Thành công",
            "counterAccountBankId": "",
            "counterAccountBankName": "",
            "counterAccountName": "",
            "counterAccountNumber": "",
            "virtualAccountName": "",
            "virtualAccountNumber": ""
        },
        "signature": "abc"
    }"#;

    #[test]
    fn parses_paid_webhook() {
        let webhook: PayOsWebhook = serde_json::from_str(PAID_BODY).unwrap();

        assert!(webhook.is_paid());
        assert_eq!(webhook.order_code(), 123);
        assert_eq!(webhook.data.amount, 3000);
        assert_eq!(webhook.data.reference.as_deref(), Some("TF230204212323"));
        assert_eq!(webhook.signature.as_deref(), Some("abc"));
    }

    #[test]
    fn non_success_transaction_code_is_not_paid() {
        let mut body: serde_json::Value = serde_json::from_str(PAID_BODY).unwrap();
        body["data"]["code"] = "01".into();
        body["data"]["desc"] = "Huỷ".into();
        let webhook: PayOsWebhook = serde_json::from_value(body).unwrap();

        assert!(!webhook.is_paid());
        assert_eq!(webhook.failure_reason(), "gateway code 01: Huỷ");
    }

    #[test]
    fn minimal_data_parses_with_defaults() {
        let webhook: PayOsWebhook =
            serde_json::from_str(r#"{"code":"00","data":{"orderCode":1,"amount":5}}"#).unwrap();
        assert!(webhook.signature.is_none());
        assert!(webhook.data.reference.is_none());
        assert!(!webhook.is_paid());
    }

    #[test]
    fn return_callback_success_claim() {
        let callback = ReturnCallback {
            code: "00".into(),
            desc: None,
            data: None,
            id: Some("link".into()),
            order_code: 7,
            cancel: Some(false),
            status: Some("PAID".into()),
        };
        assert!(callback.claims_success());

        let cancelled = ReturnCallback {
            cancel: Some(true),
            status: Some("CANCELLED".into()),
            ..callback.clone()
        };
        assert!(!cancelled.claims_success());
    }
}
