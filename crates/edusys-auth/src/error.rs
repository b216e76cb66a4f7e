use thiserror::Error;

/// Why a token was rejected.
///
/// Callers outside the authentication layer must not surface which variant
/// occurred; every variant means "not authenticated".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Not a compact JWS, or header/payload could not be decoded.
    #[error("malformed token")]
    Malformed,
    /// The integrity tag does not match the signed content.
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    /// The encoder refused the claims. Not reachable for well-formed input.
    #[error("failed to encode token: {0}")]
    Encoding(String),
}

impl TokenError {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            TokenError::Malformed => "malformed",
            TokenError::InvalidSignature => "invalid_signature",
            TokenError::Expired => "expired",
            TokenError::Encoding(_) => "encoding",
        }
    }
}
