use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jwt_secret: String,
    pub payment_key_id: String,
    pub payment_key_secret: String,
    pub payment_base_url: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            jwt_secret: env::var("CLINIC_JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("CLINIC_JWT_SECRET not set, using empty value");
                    String::new()
                }),
            payment_key_id: env::var("PAYMENT_KEY_ID")
                .unwrap_or_else(|_| {
                    warn!("PAYMENT_KEY_ID not set, using empty value");
                    String::new()
                }),
            payment_key_secret: env::var("PAYMENT_KEY_SECRET")
                .unwrap_or_else(|_| {
                    warn!("PAYMENT_KEY_SECRET not set, using empty value");
                    String::new()
                }),
            payment_base_url: env::var("PAYMENT_BASE_URL")
                .unwrap_or_else(|_| {
                    warn!("PAYMENT_BASE_URL not set, using default");
                    "https://api.razorpay.com".to_string()
                }),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.jwt_secret.is_empty()
            && !self.payment_key_id.is_empty()
            && !self.payment_key_secret.is_empty()
    }
}
