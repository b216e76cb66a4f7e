//! # edusys db
//!
//! Connection pool setup and the permission store.
//!
//! # Example
//!
//! ```ignore
//! use edusys_config::DatabaseConfig;
//! use edusys_db::{PgPermissionRepository, PermissionStore, init_db_pool};
//!
//! let pool = init_db_pool(&DatabaseConfig::from_env()).await?;
//! let store = PgPermissionRepository::new(pool.clone());
//! let grants = store.list_by_subject(user_id).await?;
//! ```

pub mod permissions;

pub use permissions::{
    InMemoryPermissionRepository, PermissionRepository, PermissionStore, PgPermissionRepository,
    StoreError,
};
pub use sqlx::PgPool;

use edusys_config::DatabaseConfig;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

/// Connects a PostgreSQL pool. Call once at startup; the pool is cheap to
/// clone into request state.
pub async fn init_db_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await?;

    info!(max_connections = config.max_connections, "Database pool ready");

    Ok(pool)
}
