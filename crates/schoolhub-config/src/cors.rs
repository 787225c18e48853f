use std::env;

pub const DEFAULT_ORIGIN: &str = "http://localhost:3000";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    /// `CORS_ORIGIN`, comma separated.
    pub fn from_env() -> Self {
        Self::parse(&env::var("CORS_ORIGIN").unwrap_or_else(|_| DEFAULT_ORIGIN.to_string()))
    }

    pub fn parse(raw: &str) -> Self {
        let allowed_origins = raw
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self { allowed_origins }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self::parse(DEFAULT_ORIGIN)
    }
}
