use std::sync::Arc;

use sqlx::PgPool;

use edusys_auth::TokenCodec;
use edusys_config::{AuthorizationConfig, CorsConfig, DatabaseConfig, JwtConfig};
use edusys_db::{PermissionRepository, PgPermissionRepository, init_db_pool};

/// Shared, read-only state handed to every handler and extractor.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub tokens: TokenCodec,
    pub permissions: Arc<dyn PermissionRepository>,
    pub authorization: AuthorizationConfig,
    pub cors_config: CorsConfig,
}

impl AppState {
    pub fn new(
        db: PgPool,
        jwt_config: &JwtConfig,
        authorization: AuthorizationConfig,
        cors_config: CorsConfig,
    ) -> Self {
        Self {
            permissions: Arc::new(PgPermissionRepository::new(db.clone())),
            tokens: TokenCodec::from_config(jwt_config),
            db,
            authorization,
            cors_config,
        }
    }

    /// Swaps the permission backend, e.g. for an in-memory store in tests.
    pub fn with_permission_repository(mut self, permissions: Arc<dyn PermissionRepository>) -> Self {
        self.permissions = permissions;
        self
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("tokens", &self.tokens)
            .field("authorization", &self.authorization)
            .field("cors_config", &self.cors_config)
            .finish_non_exhaustive()
    }
}

pub async fn init_app_state() -> Result<AppState, sqlx::Error> {
    let db = init_db_pool(&DatabaseConfig::from_env()).await?;

    Ok(AppState::new(
        db,
        &JwtConfig::from_env(),
        AuthorizationConfig::from_env(),
        CorsConfig::from_env(),
    ))
}
