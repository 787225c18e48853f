//! # SchoolHub Auth
//!
//! Session token claims and JWT utilities for the SchoolHub API.
//!
//! - [`claims`]: claim structures for access and refresh tokens
//! - [`jwt`]: token issuance and verification
//!
//! # Token Types
//!
//! - **Access Token** ([`AccessClaims`]): short-lived, carries the account
//!   role, signed with `ACCESS_TOKEN_SECRET`
//! - **Refresh Token** ([`RefreshClaims`]): long-lived, stored against the
//!   account on login and cleared on logout, signed with
//!   `REFRESH_TOKEN_SECRET`
//!
//! # Example
//!
//! ```ignore
//! use schoolhub_auth::{create_access_token, verify_access_token};
//! use schoolhub_config::JwtConfig;
//!
//! let config = JwtConfig::from_env();
//! let token = create_access_token(user_id, "admin", &config)?;
//! let claims = verify_access_token(&token, &config)?;
//! assert_eq!(claims.sub, user_id.to_string());
//! ```

pub mod claims;
pub mod jwt;

// Re-export commonly used types at crate root
pub use claims::{AccessClaims, RefreshClaims};
pub use jwt::{
    TokenError, create_access_token, create_refresh_token, verify_access_token,
    verify_refresh_token,
};
