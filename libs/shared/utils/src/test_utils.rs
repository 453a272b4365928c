use std::sync::Arc;

use base64::{engine::general_purpose, Engine as _};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::{Role, Session};

pub struct TestConfig {
    pub jwt_secret: String,
    pub payment_key_id: String,
    pub payment_key_secret: String,
    pub payment_base_url: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            payment_key_id: "rzp_test_key".to_string(),
            payment_key_secret: "test-payment-secret".to_string(),
            payment_base_url: "http://localhost:8099".to_string(),
        }
    }
}

impl TestConfig {
    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            jwt_secret: self.jwt_secret.clone(),
            payment_key_id: self.payment_key_id.clone(),
            payment_key_secret: self.payment_key_secret.clone(),
            payment_base_url: self.payment_base_url.clone(),
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestIdentity {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

impl TestIdentity {
    pub fn new(email: &str, role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.to_string(),
            role,
        }
    }

    pub fn doctor(email: &str) -> Self {
        Self::new(email, Role::Doctor)
    }

    pub fn patient(email: &str) -> Self {
        Self::new(email, Role::Patient)
    }

    pub fn admin(email: &str) -> Self {
        Self::new(email, Role::Admin)
    }

    pub fn to_session(&self) -> Session {
        Session {
            user_id: self.id,
            role: self.role,
            email: Some(self.email.clone()),
            expires_at: Some(Utc::now() + Duration::hours(24)),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(identity: &TestIdentity, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": identity.id.to_string(),
            "email": identity.email,
            "role": identity.role.to_string(),
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(identity: &TestIdentity, secret: &str) -> String {
        Self::create_test_token(identity, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(identity: &TestIdentity) -> String {
        Self::create_test_token(identity, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = TestConfig::default();
        let app_config = config.to_app_config();

        assert!(!app_config.jwt_secret.is_empty());
        assert!(app_config.is_configured());
    }

    #[test]
    fn test_identity_creation() {
        let identity = TestIdentity::doctor("doc@example.com");
        assert_eq!(identity.email, "doc@example.com");
        assert_eq!(identity.role, Role::Doctor);

        let session = identity.to_session();
        assert_eq!(session.user_id, identity.id);
        assert!(session.is_doctor());
    }

    #[test]
    fn test_jwt_token_creation() {
        let identity = TestIdentity::patient("p@example.com");
        let token = JwtTestUtils::create_test_token(&identity, "test-secret", Some(1));

        assert_eq!(token.split('.').count(), 3);
    }
}
