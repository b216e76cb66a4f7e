//! # edusys config
//!
//! Configuration loaded once from environment variables at startup and then
//! passed by value into the components that need it:
//!
//! - [`jwt`]: token signing secret and validity
//! - [`authorization`]: permission lookup bound
//! - [`cors`]: allowed origins
//! - [`database`]: connection string and pool size
//! - [`server`]: listen addresses
//!
//! # Example
//!
//! ```ignore
//! use edusys_config::{AuthorizationConfig, CorsConfig, JwtConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! let authorization = AuthorizationConfig::from_env();
//! let cors_config = CorsConfig::from_env();
//! ```

pub mod authorization;
pub mod cors;
pub mod database;
pub mod jwt;
pub mod server;

pub use authorization::AuthorizationConfig;
pub use cors::CorsConfig;
pub use database::DatabaseConfig;
pub use jwt::JwtConfig;
pub use server::ServerConfig;

/// Reads an environment variable and parses it, falling back to `default`
/// when it is unset or unparsable.
pub(crate) fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
