use std::time::Duration;

const DEFAULT_LOOKUP_TIMEOUT_MS: u64 = 3000;

/// Settings for the per-request authorization check.
#[derive(Clone, Debug)]
pub struct AuthorizationConfig {
    /// Upper bound on a single permission lookup. A lookup that takes longer
    /// is abandoned and the request denied.
    pub lookup_timeout: Duration,
}

impl AuthorizationConfig {
    pub fn from_env() -> Self {
        let ms = crate::env_or("AUTHZ_LOOKUP_TIMEOUT_MS", DEFAULT_LOOKUP_TIMEOUT_MS).max(1);
        Self {
            lookup_timeout: Duration::from_millis(ms),
        }
    }
}

impl Default for AuthorizationConfig {
    fn default() -> Self {
        Self {
            lookup_timeout: Duration::from_millis(DEFAULT_LOOKUP_TIMEOUT_MS),
        }
    }
}
