use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,
    pub role: String,
    pub exp: i64,
}

impl Claims {
    pub fn new(employee_id: Uuid, role: String) -> Self {
        Self {
            sub: employee_id,
            role,
            exp: (Utc::now() + Duration::hours(24)).timestamp(),
        }
    }
}

pub fn encode_token(claims: &Claims, secret: &str) -> Result<String, String> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| format!("JWT encode failed: {e}"))
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| format!("JWT decode failed: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_preserves_claims() {
        let claims = Claims::new(Uuid::now_v7(), "hr".to_string());
        let token = encode_token(&claims, "test-secret").unwrap();
        let decoded = decode_token(&token, "test-secret").unwrap();
        assert_eq!(decoded.sub, claims.sub);
        assert_eq!(decoded.role, "hr");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let claims = Claims::new(Uuid::now_v7(), "employee".to_string());
        let token = encode_token(&claims, "test-secret").unwrap();
        assert!(decode_token(&token, "other-secret").is_err());
    }
}
