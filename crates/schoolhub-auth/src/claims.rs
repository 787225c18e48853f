//! JWT claim structures for session tokens.

use serde::{Deserialize, Serialize};

/// Claims embedded in access tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Account id (subject claim)
    pub sub: String,
    /// Account role at issuance, e.g. `admin`
    pub role: String,
    /// Expiration timestamp (Unix seconds)
    pub exp: usize,
    /// Issued-at timestamp (Unix seconds)
    pub iat: usize,
}

/// Claims embedded in refresh tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: String,
    pub exp: usize,
    pub iat: usize,
    /// Unique token id, so two logins in the same second differ
    pub jti: String,
}
