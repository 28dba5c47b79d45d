//! PayOS webhook signature verification.
//!
//! PayOS signs the `data` object of each webhook with HMAC-SHA256 keyed by
//! the merchant checksum key. The signed message is the data object's fields
//! sorted by key and joined as `key=value&key=value`, where null becomes an
//! empty string and nested arrays/objects are written as JSON.

use hmac::{Hmac, Mac};
use serde_json::{Map, Value};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::errors::WebhookError;
use super::payos_event::PayOsWebhook;

/// Verifier for PayOS webhook signatures.
#[derive(Clone)]
pub struct PayOsSignatureVerifier {
    checksum_key: String,
}

impl PayOsSignatureVerifier {
    pub fn new(checksum_key: impl Into<String>) -> Self {
        Self {
            checksum_key: checksum_key.into(),
        }
    }

    /// Verifies the signature and parses the webhook.
    ///
    /// The header signature wins when present; otherwise the body's
    /// `signature` field is used.
    ///
    /// # Errors
    ///
    /// - `ParseError` - payload is not JSON or does not match the webhook schema
    /// - `MissingField` - no `data` field
    /// - `SignatureInvalid` - no signature supplied or it does not match `data`
    pub fn verify_and_parse(
        &self,
        payload: &[u8],
        header_signature: Option<&str>,
    ) -> Result<PayOsWebhook, WebhookError> {
        let body: Value =
            serde_json::from_slice(payload).map_err(|e| WebhookError::ParseError(e.to_string()))?;

        let data = body.get("data").ok_or(WebhookError::MissingField("data"))?;

        let signature = header_signature
            .filter(|s| !s.trim().is_empty())
            .or_else(|| body.get("signature").and_then(Value::as_str))
            .ok_or(WebhookError::SignatureInvalid)?;

        if !self.verify_signature(data, signature) {
            return Err(WebhookError::SignatureInvalid);
        }

        serde_json::from_value(body).map_err(|e| WebhookError::ParseError(e.to_string()))
    }

    /// Checks a hex signature against a `data` object in constant time.
    ///
    /// Returns false for anything that is not an object or not valid hex.
    pub fn verify_signature(&self, data: &Value, signature: &str) -> bool {
        let Some(object) = data.as_object() else {
            return false;
        };
        let Ok(supplied) = hex::decode(signature.trim()) else {
            return false;
        };
        match self.compute_signature(object) {
            Ok(expected) => constant_time_compare(&expected, &supplied),
            Err(_) => false,
        }
    }

    /// Produces the hex signature PayOS would attach to `data`.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if `data` is not a JSON object.
    pub fn sign(&self, data: &Value) -> Result<String, WebhookError> {
        let object = data
            .as_object()
            .ok_or_else(|| WebhookError::ParseError("data must be an object".to_string()))?;
        Ok(hex::encode(self.compute_signature(object)?))
    }

    fn compute_signature(&self, data: &Map<String, Value>) -> Result<Vec<u8>, WebhookError> {
        let mut mac = Hmac::<Sha256>::new_from_slice(self.checksum_key.as_bytes())
            .map_err(|_| WebhookError::SignatureInvalid)?;
        mac.update(canonical_data_string(data).as_bytes());
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

impl std::fmt::Debug for PayOsSignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayOsSignatureVerifier")
            .field("checksum_key", &"[REDACTED]")
            .finish()
    }
}

/// Builds the signed message for a `data` object.
pub fn canonical_data_string(data: &Map<String, Value>) -> String {
    let mut keys: Vec<&String> = data.keys().collect();
    keys.sort();

    keys.into_iter()
        .map(|key| format!("{}={}", key, canonical_value(&data[key.as_str()])))
        .collect::<Vec<_>>()
        .join("&")
}

fn canonical_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
