//! Razorpay payment gateway client: order creation and signature
//! verification.

use hmac::{Hmac, Mac};
use rand::RngCore;
use serde_json::{json, Value};
use sha2::Sha256;
use thiserror::Error;

use crate::config::RazorpayConfig;

type HmacSha256 = Hmac<Sha256>;

const ORDERS_URL: &str = "https://api.razorpay.com/v1/orders";

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("payment gateway is not configured")]
    NotConfigured,
    #[error("order creation failed: {status} - {message}")]
    OrderCreation { status: u16, message: String },
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Clone)]
pub struct RazorpayClient {
    client: reqwest::Client,
    key_id: String,
    secret_key: String,
}

impl RazorpayClient {
    pub fn from_config(config: &RazorpayConfig) -> Result<Self, PaymentError> {
        if config.key_id.is_empty() || config.secret_key.is_empty() {
            return Err(PaymentError::NotConfigured);
        }

        Ok(Self {
            client: reqwest::Client::new(),
            key_id: config.key_id.clone(),
            secret_key: config.secret_key.clone(),
        })
    }

    /// Create a gateway order. The amount arrives in rupees and is billed in
    /// paise.
    pub async fn create_order(&self, amount: f64) -> Result<Value, PaymentError> {
        let body = json!({
            "amount": (amount * 100.0).round() as i64,
            "currency": "INR",
            "receipt": receipt_nonce(),
        });

        let response = self
            .client
            .post(ORDERS_URL)
            .basic_auth(&self.key_id, Some(&self.secret_key))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(PaymentError::OrderCreation { status, message });
        }

        Ok(response.json().await?)
    }

    /// Check the gateway callback signature: HMAC-SHA256 over
    /// `"{order_id}|{payment_id}"` with the secret key.
    pub fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        let Ok(mut mac) = HmacSha256::new_from_slice(self.secret_key.as_bytes()) else {
            return false;
        };
        mac.update(format!("{order_id}|{payment_id}").as_bytes());

        let expected = hex::encode(mac.finalize().into_bytes());
        expected == signature
    }
}

fn receipt_nonce() -> String {
    let mut bytes = [0u8; 10];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RazorpayConfig;

    fn client() -> RazorpayClient {
        RazorpayClient::from_config(&RazorpayConfig {
            key_id: "rzp_test_key".to_string(),
            secret_key: "rzp_test_secret".to_string(),
        })
        .unwrap()
    }

    fn sign(secret: &str, order_id: &str, payment_id: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{order_id}|{payment_id}").as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn missing_keys_are_rejected_at_construction() {
        let result = RazorpayClient::from_config(&RazorpayConfig {
            key_id: String::new(),
            secret_key: String::new(),
        });
        assert!(matches!(result, Err(PaymentError::NotConfigured)));
    }

    #[test]
    fn a_correctly_signed_callback_verifies() {
        let client = client();
        let signature = sign("rzp_test_secret", "order_1", "pay_1");

        assert!(client.verify_signature("order_1", "pay_1", &signature));
    }

    #[test]
    fn a_tampered_callback_does_not_verify() {
        let client = client();
        let signature = sign("rzp_test_secret", "order_1", "pay_1");

        assert!(!client.verify_signature("order_2", "pay_1", &signature));
        assert!(!client.verify_signature("order_1", "pay_2", &signature));
        assert!(!client.verify_signature("order_1", "pay_1", "deadbeef"));
    }

    #[test]
    fn receipt_nonce_is_twenty_hex_chars() {
        let nonce = receipt_nonce();
        assert_eq!(nonce.len(), 20);
        assert!(nonce.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
