//! # SchoolHub Config
//!
//! Configuration types for the SchoolHub API.
//!
//! Every structure is loaded once at startup from environment variables and
//! handed to the router through the application state:
//!
//! - [`jwt`]: access/refresh token secrets and lifetimes
//! - [`cors`]: allowed browser origins
//! - [`media`]: avatar storage (local directory or Cloudinary)
//! - [`server`]: listener settings
//!
//! # Example
//!
//! ```ignore
//! use schoolhub_config::{CorsConfig, JwtConfig, MediaConfig, ServerConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! let cors_config = CorsConfig::from_env();
//! let media_config = MediaConfig::from_env();
//! let server_config = ServerConfig::from_env();
//! ```

pub mod cors;
pub mod jwt;
pub mod media;
pub mod server;

// Re-export commonly used types at crate root
pub use cors::CorsConfig;
pub use jwt::JwtConfig;
pub use media::{CloudinaryCredentials, MediaConfig};
pub use server::ServerConfig;

/// Reads and parses a variable, falling back to `default` when unset or malformed.
pub(crate) fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
