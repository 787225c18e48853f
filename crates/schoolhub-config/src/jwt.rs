use std::env;

use crate::env_or;

const DEV_ACCESS_SECRET: &str = "dev-access-secret-change-in-production";
const DEV_REFRESH_SECRET: &str = "dev-refresh-secret-change-in-production";

/// One day.
pub const DEFAULT_ACCESS_TOKEN_EXPIRY: i64 = 86_400;
/// Seven days.
pub const DEFAULT_REFRESH_TOKEN_EXPIRY: i64 = 604_800;

/// Secrets and lifetimes (in seconds) for the two session tokens.
///
/// Access and refresh tokens are signed with different secrets so that one
/// can never be replayed as the other.
#[derive(Clone)]
pub struct JwtConfig {
    pub access_token_secret: String,
    pub refresh_token_secret: String,
    pub access_token_expiry: i64,
    pub refresh_token_expiry: i64,
}

impl JwtConfig {
    pub fn from_env() -> Self {
        let access_token_secret = env::var("ACCESS_TOKEN_SECRET").unwrap_or_else(|_| {
            tracing::warn!("ACCESS_TOKEN_SECRET not set, using development secret");
            DEV_ACCESS_SECRET.to_string()
        });
        let refresh_token_secret = env::var("REFRESH_TOKEN_SECRET").unwrap_or_else(|_| {
            tracing::warn!("REFRESH_TOKEN_SECRET not set, using development secret");
            DEV_REFRESH_SECRET.to_string()
        });

        Self {
            access_token_secret,
            refresh_token_secret,
            access_token_expiry: env_or("ACCESS_TOKEN_EXPIRY", DEFAULT_ACCESS_TOKEN_EXPIRY),
            refresh_token_expiry: env_or("REFRESH_TOKEN_EXPIRY", DEFAULT_REFRESH_TOKEN_EXPIRY),
        }
    }
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("access_token_secret", &"<redacted>")
            .field("refresh_token_secret", &"<redacted>")
            .field("access_token_expiry", &self.access_token_expiry)
            .field("refresh_token_expiry", &self.refresh_token_expiry)
            .finish()
    }
}
