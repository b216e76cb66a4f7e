use std::env;

/// Default session validity in seconds.
pub const DEFAULT_EXPIRES_IN: i64 = 3600;

/// Longest accepted session validity in seconds (one year).
pub const MAX_EXPIRES_IN: i64 = 365 * 24 * 3600;

/// Signing secret and session validity for issued tokens.
#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    /// Validity of an issued token, in seconds.
    pub expires_in: i64,
}

impl JwtConfig {
    /// Loads `JWT_SECRET` (required) and `JWT_EXPIRES_IN` (seconds, default 3600).
    ///
    /// # Panics
    ///
    /// Panics when `JWT_SECRET` is unset or empty. There is no safe default
    /// for a signing key.
    pub fn from_env() -> Self {
        let secret = env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .expect("JWT_SECRET must be set");

        let expires_in = clamp_expires_in(crate::env_or("JWT_EXPIRES_IN", DEFAULT_EXPIRES_IN));

        Self { secret, expires_in }
    }
}

/// Bounds a configured validity to `1..=MAX_EXPIRES_IN` seconds.
pub fn clamp_expires_in(seconds: i64) -> i64 {
    seconds.clamp(1, MAX_EXPIRES_IN)
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}
