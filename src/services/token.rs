//! Signed bearer tokens (JWT, HS256).

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SecurityConfig;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token signing secret is empty")]
    MissingSecret,

    #[error("Failed to sign token: {0}")]
    Sign(String),

    #[error("Invalid token: {0}")]
    Invalid(String),
}

/// Token payload. `iat` and `exp` are Unix timestamps in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

pub trait TokenIssuer: Send + Sync {
    /// Signs a token asserting `username`.
    fn issue(&self, username: &str) -> Result<String, TokenError>;

    /// Checks signature and expiry and returns the embedded claims.
    fn verify(&self, token: &str) -> Result<Claims, TokenError>;
}

pub struct JwtTokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_seconds: i64,
}

impl JwtTokenIssuer {
    pub fn new(secret: &str, ttl_seconds: u64) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_seconds: i64::try_from(ttl_seconds).unwrap_or(i64::MAX),
        })
    }

    pub fn from_config(config: &SecurityConfig) -> Result<Self, TokenError> {
        Self::new(&config.jwt_secret, config.token_ttl_seconds)
    }

    fn claims_for(&self, username: &str, issued_at: i64) -> Claims {
        Claims {
            username: username.to_string(),
            iat: issued_at,
            exp: issued_at.saturating_add(self.ttl_seconds),
        }
    }

    fn encode_claims(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| TokenError::Sign(e.to_string()))
    }
}

impl TokenIssuer for JwtTokenIssuer {
    fn issue(&self, username: &str) -> Result<String, TokenError> {
        let claims = self.claims_for(username, Utc::now().timestamp());
        self.encode_claims(&claims)
    }

    fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| TokenError::Invalid(e.to_string()))
    }
}
