use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 3600;

const TOKEN_PURPOSE: &str = "course-form";

#[derive(Debug, Clone)]
pub struct FormTokenConfig {
    pub secret_key: String,
    pub ttl_seconds: i64,
}

impl FormTokenConfig {
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormTokenError {
    #[error("The CSRF token is missing.")]
    Missing,
    #[error("The CSRF token is invalid.")]
    Invalid,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    jti: String,
    iat: i64,
    exp: i64,
    purpose: String,
}

pub fn issue_form_token(cfg: &FormTokenConfig) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let exp = now + Duration::seconds(cfg.ttl_seconds);
    let claims = Claims {
        jti: Uuid::new_v4().to_string(),
        iat: now.timestamp(),
        exp: exp.timestamp(),
        purpose: TOKEN_PURPOSE.to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(cfg.secret_key.as_bytes()),
    )
}

/// Checks signature, expiry and purpose of a token minted by [`issue_form_token`].
pub fn verify_form_token(cfg: &FormTokenConfig, token: &str) -> Result<(), FormTokenError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(FormTokenError::Missing);
    }

    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(cfg.secret_key.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| FormTokenError::Invalid)?;

    if decoded.claims.purpose != TOKEN_PURPOSE {
        return Err(FormTokenError::Invalid);
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/csrf_tests.rs"]
mod tests;
