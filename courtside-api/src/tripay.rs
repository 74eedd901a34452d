/// Tripay payment-gateway client
///
/// Thin client for the Tripay merchant API: payment-channel listing, fee
/// calculation, closed-transaction creation, and callback signature
/// verification.
///
/// # Signatures
///
/// - Transaction creation signs `merchant_code + merchant_ref + amount`
///   with HMAC-SHA256 over the merchant private key, hex-encoded.
/// - Callbacks carry `X-Callback-Signature`: HMAC-SHA256 of the raw JSON
///   body with the same key. Verification is constant-time.

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::Sha256;

use crate::config::TripayConfig;

type HmacSha256 = Hmac<Sha256>;

/// Error type for gateway operations
#[derive(Debug, thiserror::Error)]
pub enum TripayError {
    /// Transport-level failure (connect, timeout, decode)
    #[error("gateway request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The gateway answered with success=false
    #[error("gateway rejected request: {0}")]
    Rejected(String),
}

/// Envelope every Tripay endpoint responds with
#[derive(Debug, Deserialize)]
struct GatewayResponse<T> {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<T>,
}

impl<T> GatewayResponse<T> {
    fn into_data(self) -> Result<T, TripayError> {
        if !self.success {
            return Err(TripayError::Rejected(
                self.message.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }
        self.data
            .ok_or_else(|| TripayError::Rejected("response carried no data".to_string()))
    }
}

/// One line item of a transaction
#[derive(Debug, Clone, Serialize)]
pub struct OrderItem {
    pub sku: String,
    pub name: String,
    pub price: i64,
    pub quantity: u32,
}

/// Request body for `transaction/create`
#[derive(Debug, Clone, Serialize)]
pub struct CreateTransaction {
    pub method: String,
    pub merchant_ref: String,
    pub amount: i64,
    pub customer_name: String,
    pub customer_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,
    pub order_items: Vec<OrderItem>,
    /// Unix timestamp the payment window closes at
    pub expired_time: i64,
    pub signature: String,
}

/// Fields we consume from a created transaction
///
/// The gateway returns more; unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionData {
    pub reference: String,
    pub merchant_ref: String,
    pub checkout_url: Option<String>,
    pub status: String,
    pub amount: i64,
    #[serde(default)]
    pub total_fee: Option<i64>,
}

/// Payload of a `payment_status` callback
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackPayload {
    pub reference: String,
    pub merchant_ref: String,
    pub status: String,
    #[serde(default)]
    pub total_amount: Option<i64>,
    #[serde(default)]
    pub paid_at: Option<i64>,
}

/// Tripay merchant API client
#[derive(Clone)]
pub struct TripayClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    private_key: String,
    merchant_code: String,
}

impl TripayClient {
    /// Creates a client from gateway configuration
    pub fn new(config: &TripayConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            private_key: config.private_key.clone(),
            merchant_code: config.merchant_code.clone(),
        }
    }

    fn mac(&self) -> HmacSha256 {
        // HMAC accepts keys of any size, so this cannot fail.
        HmacSha256::new_from_slice(self.private_key.as_bytes())
            .expect("HMAC accepts keys of any size")
    }

    /// Signature for a closed transaction
    pub fn transaction_signature(&self, merchant_ref: &str, amount: i64) -> String {
        let mut mac = self.mac();
        mac.update(self.merchant_code.as_bytes());
        mac.update(merchant_ref.as_bytes());
        mac.update(amount.to_string().as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Verifies a callback body against its `X-Callback-Signature` header
    ///
    /// Constant-time; any malformed hex fails closed.
    pub fn verify_callback_signature(&self, raw_body: &[u8], signature_hex: &str) -> bool {
        let Ok(signature) = hex::decode(signature_hex.trim()) else {
            return false;
        };

        let mut mac = self.mac();
        mac.update(raw_body);
        mac.verify_slice(&signature).is_ok()
    }

    /// Lists the merchant's payment channels
    ///
    /// Returned verbatim as JSON; the handler filters against locally
    /// enabled payment methods.
    pub async fn payment_channels(&self) -> Result<Value, TripayError> {
        let response: GatewayResponse<Value> = self
            .http
            .get(format!("{}/merchant/payment-channel", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await?
            .json()
            .await?;

        response.into_data()
    }

    /// Calculates gateway fees for an amount, optionally for one channel
    pub async fn calculate_fee(
        &self,
        amount: i64,
        code: Option<&str>,
    ) -> Result<Value, TripayError> {
        let mut request = self
            .http
            .get(format!("{}/merchant/fee-calculator", self.base_url))
            .bearer_auth(&self.api_key)
            .query(&[("amount", amount.to_string())]);
        if let Some(code) = code {
            request = request.query(&[("code", code)]);
        }

        let response: GatewayResponse<Value> = request.send().await?.json().await?;
        response.into_data()
    }

    /// Creates a closed transaction and returns the gateway's record of it
    pub async fn create_transaction(
        &self,
        request: &CreateTransaction,
    ) -> Result<TransactionData, TripayError> {
        let response: GatewayResponse<TransactionData> = self
            .http
            .post(format!("{}/transaction/create", self.base_url))
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?
            .json()
            .await?;

        response.into_data()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TripayConfig;

    fn client() -> TripayClient {
        TripayClient::new(&TripayConfig {
            base_url: "https://tripay.co.id/api-sandbox/".to_string(),
            api_key: "api-key".to_string(),
            private_key: "private-key".to_string(),
            merchant_code: "T0001".to_string(),
        })
    }

    #[test]
    fn test_transaction_signature_is_hex_sha256() {
        let sig = client().transaction_signature("CSD-1", 150_000);
        assert_eq!(sig.len(), 64);
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_transaction_signature_is_deterministic() {
        let a = client().transaction_signature("CSD-1", 150_000);
        let b = client().transaction_signature("CSD-1", 150_000);
        let c = client().transaction_signature("CSD-2", 150_000);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_callback_signature_round_trip() {
        let c = client();
        let body = br#"{"merchant_ref":"CSD-1","status":"PAID"}"#;

        let mut mac = HmacSha256::new_from_slice(b"private-key").unwrap();
        mac.update(body);
        let signature = hex::encode(mac.finalize().into_bytes());

        assert!(c.verify_callback_signature(body, &signature));
        assert!(c.verify_callback_signature(body, &format!("  {}  ", signature)));
    }

    #[test]
    fn test_callback_signature_rejects_tampering() {
        let c = client();
        let body = br#"{"merchant_ref":"CSD-1","status":"PAID"}"#;
        let tampered = br#"{"merchant_ref":"CSD-1","status":"FAILED"}"#;

        let mut mac = HmacSha256::new_from_slice(b"private-key").unwrap();
        mac.update(body);
        let signature = hex::encode(mac.finalize().into_bytes());

        assert!(!c.verify_callback_signature(tampered, &signature));
        assert!(!c.verify_callback_signature(body, "not-hex"));
        assert!(!c.verify_callback_signature(body, ""));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        // format!() below would otherwise produce "…//merchant/…"
        let c = client();
        assert!(!c.base_url.ends_with('/'));
    }
}
