//! Issuing and verifying session tokens.
//!
//! Both token kinds are HS256 JWTs. Access tokens carry the role so that the
//! admin check can reject other roles before touching the store; refresh
//! tokens only identify the account.

use chrono::Utc;
use jsonwebtoken::{
    DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use uuid::Uuid;

use schoolhub_config::JwtConfig;

use crate::claims::{AccessClaims, RefreshClaims};

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token is invalid")]
    Invalid,
    #[error("token has expired")]
    Expired,
    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// Returns `(iat, exp)` for a token living `ttl_secs` from now.
///
/// A negative lifetime yields an `exp` in the past, never below zero.
fn issue_window(ttl_secs: i64) -> (usize, usize) {
    let now = Utc::now().timestamp().max(0);
    let exp = now.saturating_add(ttl_secs).max(0);
    (now as usize, exp as usize)
}

fn sign<T: Serialize>(claims: &T, secret: &str) -> Result<String, TokenError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(TokenError::Signing)
}

fn verify<T: DeserializeOwned>(token: &str, secret: &str) -> Result<T, TokenError> {
    let mut validation = Validation::default();
    validation.leeway = 0;

    decode::<T>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid,
    })
}

pub fn create_access_token(
    user_id: Uuid,
    role: &str,
    jwt_config: &JwtConfig,
) -> Result<String, TokenError> {
    let (iat, exp) = issue_window(jwt_config.access_token_expiry);

    let claims = AccessClaims {
        sub: user_id.to_string(),
        role: role.to_string(),
        exp,
        iat,
    };

    sign(&claims, &jwt_config.access_token_secret)
}

pub fn create_refresh_token(user_id: Uuid, jwt_config: &JwtConfig) -> Result<String, TokenError> {
    let (iat, exp) = issue_window(jwt_config.refresh_token_expiry);

    let claims = RefreshClaims {
        sub: user_id.to_string(),
        exp,
        iat,
        jti: Uuid::new_v4().to_string(),
    };

    sign(&claims, &jwt_config.refresh_token_secret)
}

/// Checks signature and expiry (no leeway) of an access token.
pub fn verify_access_token(
    token: &str,
    jwt_config: &JwtConfig,
) -> Result<AccessClaims, TokenError> {
    verify(token, &jwt_config.access_token_secret)
}

pub fn verify_refresh_token(
    token: &str,
    jwt_config: &JwtConfig,
) -> Result<RefreshClaims, TokenError> {
    verify(token, &jwt_config.refresh_token_secret)
}
