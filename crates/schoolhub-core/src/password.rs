//! bcrypt password hashing.
//!
//! bcrypt only reads the first [`MAX_PASSWORD_BYTES`] bytes of its input, so
//! longer passwords are refused on hashing and never match on verification.

use anyhow::anyhow;
use bcrypt::{hash, verify};

use crate::errors::AppError;

/// Work factor for stored admin passwords.
pub const HASH_COST: u32 = 10;

pub const MAX_PASSWORD_BYTES: usize = 72;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(AppError::bad_request(anyhow!(
            "password must be at most {} bytes",
            MAX_PASSWORD_BYTES
        )));
    }

    hash(password, HASH_COST)
        .map_err(|e| AppError::internal_error(format!("Failed to hash password: {}", e)))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    if password.len() > MAX_PASSWORD_BYTES {
        return Ok(false);
    }

    verify(password, hash)
        .map_err(|e| AppError::internal_error(format!("Failed to verify password: {}", e)))
}
