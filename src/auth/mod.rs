use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config;

pub mod password;

pub const TOKEN_ISSUER: &str = "hostel-api";
pub const TOKEN_AUDIENCE: &str = "hostel-client";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub uid: Uuid,
    #[serde(rename = "type")]
    pub kind: TokenKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
}

impl Claims {
    pub fn access(owner_id: Uuid) -> Self {
        let ttl = Duration::minutes(config::config().security.access_token_ttl_minutes);
        Self::new(owner_id, TokenKind::Access, None, ttl)
    }

    pub fn refresh(owner_id: Uuid, device_id: impl Into<String>) -> Self {
        let ttl = Duration::days(config::config().security.refresh_token_ttl_days);
        Self::new(owner_id, TokenKind::Refresh, Some(device_id.into()), ttl)
    }

    fn new(owner_id: Uuid, kind: TokenKind, device_id: Option<String>, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            uid: owner_id,
            kind,
            device_id,
            jti: random_token_id(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            iss: TOKEN_ISSUER.to_string(),
            aud: TOKEN_AUDIENCE.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("JWT secret not configured")]
    MissingSecret,
    #[error("token generation failed: {0}")]
    Generation(jsonwebtoken::errors::Error),
    #[error("invalid token: {0}")]
    Invalid(jsonwebtoken::errors::Error),
    #[error("wrong token type")]
    WrongKind,
}

/// 64-char hex token identifier, used as the jti claim and for generated
/// device ids.
pub fn random_token_id() -> String {
    let mut buf = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut buf);
    buf.iter().map(|b| format!("{:02x}", b)).collect()
}

pub fn generate_jwt(claims: &Claims) -> Result<String, TokenError> {
    let secret = &config::config().security.jwt_secret;
    if secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }

    let header = Header::new(Algorithm::HS512);
    encode(&header, claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(TokenError::Generation)
}

/// Validate signature, expiry, issuer and audience, then check the token is
/// of the expected kind (an access token is never accepted as a refresh
/// token and vice versa).
pub fn verify_token(token: &str, expected: TokenKind) -> Result<Claims, TokenError> {
    let secret = &config::config().security.jwt_secret;
    if secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }

    let mut validation = Validation::new(Algorithm::HS512);
    validation.set_audience(&[TOKEN_AUDIENCE]);
    validation.set_issuer(&[TOKEN_ISSUER]);

    let data = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map_err(TokenError::Invalid)?;

    if data.claims.kind != expected {
        return Err(TokenError::WrongKind);
    }

    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_token_round_trips() {
        let owner_id = Uuid::new_v4();
        let token = generate_jwt(&Claims::access(owner_id)).unwrap();

        let claims = verify_token(&token, TokenKind::Access).unwrap();
        assert_eq!(claims.uid, owner_id);
        assert_eq!(claims.kind, TokenKind::Access);
        assert!(claims.device_id.is_none());
        assert_eq!(claims.iss, TOKEN_ISSUER);
    }

    #[test]
    fn refresh_token_carries_device() {
        let owner_id = Uuid::new_v4();
        let token = generate_jwt(&Claims::refresh(owner_id, "device-1")).unwrap();

        let claims = verify_token(&token, TokenKind::Refresh).unwrap();
        assert_eq!(claims.device_id.as_deref(), Some("device-1"));
        assert_eq!(claims.jti.len(), 64);
    }

    #[test]
    fn token_kinds_are_not_interchangeable() {
        let owner_id = Uuid::new_v4();
        let access = generate_jwt(&Claims::access(owner_id)).unwrap();
        let refresh = generate_jwt(&Claims::refresh(owner_id, "device-1")).unwrap();

        assert!(matches!(verify_token(&access, TokenKind::Refresh), Err(TokenError::WrongKind)));
        assert!(matches!(verify_token(&refresh, TokenKind::Access), Err(TokenError::WrongKind)));
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let now = Utc::now();
        let claims = Claims {
            uid: Uuid::new_v4(),
            kind: TokenKind::Access,
            device_id: None,
            jti: random_token_id(),
            iat: (now - Duration::hours(2)).timestamp(),
            exp: (now - Duration::hours(1)).timestamp(),
            iss: TOKEN_ISSUER.to_string(),
            aud: TOKEN_AUDIENCE.to_string(),
        };
        let token = generate_jwt(&claims).unwrap();

        assert!(matches!(verify_token(&token, TokenKind::Access), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn garbage_tokens_are_rejected() {
        assert!(verify_token("not-a-jwt", TokenKind::Access).is_err());
    }
}
