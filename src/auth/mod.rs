pub mod password;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SecurityConfig;

pub use password::{hash_password, verify_password, PasswordError};

/// Registered claims carried by every access token. The subject is the
/// numeric user id; nothing else about the user is embedded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iss: String,
    pub aud: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: i64, security: &SecurityConfig) -> Result<Self, JwtError> {
        let now = Utc::now();
        let expires = i64::try_from(security.jwt_expiry_hours)
            .ok()
            .and_then(Duration::try_hours)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                JwtError::TokenGeneration(format!(
                    "expiry of {} hours is out of range",
                    security.jwt_expiry_hours
                ))
            })?;

        Ok(Self {
            sub: user_id.to_string(),
            iss: security.jwt_issuer.clone(),
            aud: security.jwt_audience.clone(),
            exp: expires.timestamp(),
            iat: now.timestamp(),
        })
    }

    /// Parse the subject back into a user id. Ids are always positive.
    pub fn user_id(&self) -> Result<i64, JwtError> {
        match self.sub.parse::<i64>() {
            Ok(id) if id > 0 => Ok(id),
            _ => Err(JwtError::InvalidSubject(self.sub.clone())),
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_default()
    }
}

/// A freshly signed token together with its expiry.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expiration: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT secret not configured")]
    InvalidSecret,

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),

    #[error("Invalid subject claim: {0}")]
    InvalidSubject(String),
}

/// Sign an HS256 token for `user_id` with issuer, audience and expiry from config.
pub fn generate_jwt(user_id: i64, security: &SecurityConfig) -> Result<IssuedToken, JwtError> {
    if security.jwt_secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let claims = Claims::new(user_id, security)?;
    let encoding_key = EncodingKey::from_secret(security.jwt_secret.as_bytes());
    let header = Header::new(Algorithm::HS256);

    let token = encode(&header, &claims, &encoding_key)
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))?;

    Ok(IssuedToken {
        token,
        expiration: claims.expires_at(),
    })
}

/// Check signature, issuer, audience and expiry, returning the claims.
pub fn validate_jwt(token: &str, security: &SecurityConfig) -> Result<Claims, JwtError> {
    if security.jwt_secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(security.jwt_secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[security.jwt_issuer.as_str()]);
    validation.set_audience(&[security.jwt_audience.as_str()]);
    validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| JwtError::InvalidToken(e.to_string()))?;

    Ok(token_data.claims)
}
