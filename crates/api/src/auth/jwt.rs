use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthConfig;
use crate::error::AppError;

/// Caller identity carried by bearer tokens. Tokens are issued by the identity
/// service; this crate only verifies them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub email: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid, uuid::Error> {
        Uuid::parse_str(&self.sub)
    }
}

#[derive(Clone)]
pub struct JwtService {
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        }
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn service() -> JwtService {
        JwtService::new(&AuthConfig {
            jwt_secret: "test-secret".to_string(),
        })
    }

    fn token(secret: &str, exp_offset: Duration) -> String {
        let now = Utc::now();
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            email: "organiser@example.com".to_string(),
            role: "manager".to_string(),
            iat: now.timestamp(),
            exp: (now + exp_offset).timestamp(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn accepts_tokens_signed_with_the_shared_secret() {
        let claims = service()
            .verify_token(&token("test-secret", Duration::minutes(5)))
            .unwrap();
        assert_eq!(claims.role, "manager");
        assert!(claims.user_id().is_ok());
    }

    #[test]
    fn rejects_foreign_and_expired_tokens() {
        assert!(service()
            .verify_token(&token("other-secret", Duration::minutes(5)))
            .is_err());
        assert!(service()
            .verify_token(&token("test-secret", Duration::minutes(-10)))
            .is_err());
    }
}
