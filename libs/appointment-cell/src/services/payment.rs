use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::Sha256;
use tracing::{debug, error};

use shared_config::AppConfig;

use crate::models::AppointmentError;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
}

/// External payment collaborator. An order is created before checkout; the
/// widget later reports success as a signed confirmation which
/// `verify_payment_signature` checks against the key secret.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn create_order(&self, amount: i64, receipt: &str)
        -> Result<PaymentOrder, AppointmentError>;
}

/// Checkout-API client for the hosted payment gateway.
pub struct CheckoutGateway {
    client: reqwest::Client,
    base_url: String,
    key_id: String,
    key_secret: String,
}

impl CheckoutGateway {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.payment_base_url.clone(),
            key_id: config.payment_key_id.clone(),
            key_secret: config.payment_key_secret.clone(),
        }
    }
}

#[async_trait]
impl PaymentProvider for CheckoutGateway {
    async fn create_order(
        &self,
        amount: i64,
        receipt: &str,
    ) -> Result<PaymentOrder, AppointmentError> {
        let url = format!("{}/v1/orders", self.base_url);
        debug!("Creating payment order for amount {} at {}", amount, url);

        let body = json!({
            "amount": amount,
            "currency": "INR",
            "receipt": receipt
        });

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&body)
            .send()
            .await
            .map_err(|e| AppointmentError::Payment(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Payment order creation failed ({}): {}", status, error_text);
            return Err(AppointmentError::Payment(format!(
                "Order creation failed ({})",
                status
            )));
        }

        let order = response
            .json::<PaymentOrder>()
            .await
            .map_err(|e| AppointmentError::Payment(format!("Invalid order response: {}", e)))?;

        debug!("Payment order {} created", order.id);
        Ok(order)
    }
}

/// Hex-encoded HMAC-SHA256 over `order_id|payment_id`, the signature scheme
/// the checkout widget reports back on success.
pub fn payment_signature(order_id: &str, payment_id: &str, key_secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(key_secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(format!("{}|{}", order_id, payment_id).as_bytes());
    mac.finalize()
        .into_bytes()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

pub fn verify_payment_signature(
    order_id: &str,
    payment_id: &str,
    signature: &str,
    key_secret: &str,
) -> bool {
    let signature_bytes = match decode_hex(signature) {
        Some(bytes) => bytes,
        None => return false,
    };

    let mut mac = match HmacSha256::new_from_slice(key_secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => return false,
    };
    mac.update(format!("{}|{}", order_id, payment_id).as_bytes());
    mac.verify_slice(&signature_bytes).is_ok()
}

fn decode_hex(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(s.get(i..i + 2)?, 16).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_round_trip() {
        let signature = payment_signature("order_1", "pay_1", "secret");
        assert!(verify_payment_signature("order_1", "pay_1", &signature, "secret"));
    }

    #[test]
    fn rejects_forged_signature() {
        let signature = payment_signature("order_1", "pay_1", "other-secret");
        assert!(!verify_payment_signature("order_1", "pay_1", &signature, "secret"));
    }

    #[test]
    fn rejects_signature_for_different_payment() {
        let signature = payment_signature("order_1", "pay_1", "secret");
        assert!(!verify_payment_signature("order_1", "pay_2", &signature, "secret"));
    }

    #[test]
    fn rejects_non_hex_signature() {
        assert!(!verify_payment_signature("order_1", "pay_1", "zz-not-hex", "secret"));
    }
}
