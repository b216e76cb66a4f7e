//! # edusys auth
//!
//! Signed, expiring session tokens.
//!
//! A token is a compact HS256 JWS whose payload is [`SessionClaims`]
//! (`sub`, `iat`, `exp`). [`TokenCodec`] owns the signing key and validity
//! window; both are injected at construction so nothing is read from the
//! environment while verifying.
//!
//! # Example
//!
//! ```ignore
//! use edusys_auth::TokenCodec;
//! use edusys_config::JwtConfig;
//!
//! let codec = TokenCodec::from_config(&JwtConfig::from_env());
//!
//! let token = codec.issue(&user_id.to_string())?;
//! let claims = codec.verify(&token)?;
//! assert_eq!(claims.sub, user_id.to_string());
//! ```

pub mod claims;
pub mod codec;
pub mod error;

pub use claims::SessionClaims;
pub use codec::TokenCodec;
pub use error::TokenError;
