//! Permission storage.
//!
//! [`PermissionStore`] is the read path used by the authorization check: it
//! returns the current, committed set of records owned by a subject, and
//! never caches. [`PermissionRepository`] adds the administrative write path.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgExecutor, PgPool};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, error, instrument};

use edusys_models::{Permission, PermissionId, UserId};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("permission not found")]
    NotFound,
    #[error("permission store unavailable")]
    Unavailable,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait PermissionStore: Send + Sync {
    /// Every record owned by `user_id`, possibly none.
    async fn list_by_subject(&self, user_id: UserId) -> Result<Vec<Permission>, StoreError>;
}

#[async_trait]
pub trait PermissionRepository: PermissionStore {
    async fn save(&self, permission: Permission) -> Result<Permission, StoreError>;

    /// Replaces the mutable fields of an existing record.
    async fn update(&self, permission: Permission) -> Result<Permission, StoreError>;

    async fn delete(&self, id: PermissionId) -> Result<(), StoreError>;

    async fn find_by_id(&self, id: PermissionId) -> Result<Permission, StoreError>;

    async fn find_all(&self) -> Result<Vec<Permission>, StoreError>;
}

/// PostgreSQL-backed repository over the `permissions` table.
#[derive(Debug, Clone)]
pub struct PgPermissionRepository {
    pool: PgPool,
}

impl PgPermissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a record through any executor, so callers can make the grant
    /// part of a wider transaction.
    pub async fn insert<'e, E>(executor: E, permission: &Permission) -> Result<Permission, StoreError>
    where
        E: PgExecutor<'e>,
    {
        let saved = sqlx::query_as::<_, Permission>(
            "INSERT INTO permissions (id, user_id, modules, actions, level, description, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING id, user_id, modules, actions, level, description, created_at, updated_at",
        )
        .bind(permission.id)
        .bind(permission.user_id)
        .bind(&permission.modules)
        .bind(&permission.actions)
        .bind(&permission.level)
        .bind(&permission.description)
        .bind(permission.created_at)
        .bind(permission.updated_at)
        .fetch_one(executor)
        .await?;

        Ok(saved)
    }
}

#[async_trait]
impl PermissionStore for PgPermissionRepository {
    #[instrument(skip(self), fields(db.operation = "SELECT", db.table = "permissions"))]
    async fn list_by_subject(&self, user_id: UserId) -> Result<Vec<Permission>, StoreError> {
        let permissions = sqlx::query_as::<_, Permission>(
            "SELECT id, user_id, modules, actions, level, description, created_at, updated_at
             FROM permissions WHERE user_id = $1 ORDER BY created_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!(user.id = %user_id, error = %e, "Database error listing permissions");
            StoreError::from(e)
        })?;

        debug!(user.id = %user_id, count = permissions.len(), "Permissions loaded");

        Ok(permissions)
    }
}

#[async_trait]
impl PermissionRepository for PgPermissionRepository {
    #[instrument(skip(self, permission), fields(permission.id = %permission.id, db.operation = "INSERT", db.table = "permissions"))]
    async fn save(&self, permission: Permission) -> Result<Permission, StoreError> {
        Self::insert(&self.pool, &permission).await
    }

    #[instrument(skip(self, permission), fields(permission.id = %permission.id, db.operation = "UPDATE", db.table = "permissions"))]
    async fn update(&self, permission: Permission) -> Result<Permission, StoreError> {
        sqlx::query_as::<_, Permission>(
            "UPDATE permissions
             SET modules = $2, actions = $3, level = $4, description = $5, updated_at = $6
             WHERE id = $1
             RETURNING id, user_id, modules, actions, level, description, created_at, updated_at",
        )
        .bind(permission.id)
        .bind(&permission.modules)
        .bind(&permission.actions)
        .bind(&permission.level)
        .bind(&permission.description)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    #[instrument(skip(self), fields(db.operation = "DELETE", db.table = "permissions"))]
    async fn delete(&self, id: PermissionId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM permissions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }

    #[instrument(skip(self), fields(db.operation = "SELECT", db.table = "permissions"))]
    async fn find_by_id(&self, id: PermissionId) -> Result<Permission, StoreError> {
        sqlx::query_as::<_, Permission>(
            "SELECT id, user_id, modules, actions, level, description, created_at, updated_at
             FROM permissions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    #[instrument(skip(self), fields(db.operation = "SELECT", db.table = "permissions"))]
    async fn find_all(&self) -> Result<Vec<Permission>, StoreError> {
        let permissions = sqlx::query_as::<_, Permission>(
            "SELECT id, user_id, modules, actions, level, description, created_at, updated_at
             FROM permissions ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(permissions)
    }
}

/// Process-local repository for tests and tooling. It can be switched into an
/// unavailable state to exercise storage failures.
#[derive(Debug, Default)]
pub struct InMemoryPermissionRepository {
    records: RwLock<HashMap<PermissionId, Permission>>,
    unavailable: AtomicBool,
}

impl InMemoryPermissionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = Permission>) -> Self {
        Self {
            records: RwLock::new(records.into_iter().map(|p| (p.id, p)).collect()),
            unavailable: AtomicBool::new(false),
        }
    }

    /// While set, every operation fails with [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable);
        }
        Ok(())
    }
}

fn by_creation(mut permissions: Vec<Permission>) -> Vec<Permission> {
    permissions.sort_by_key(|p| (p.created_at, p.id));
    permissions
}

#[async_trait]
impl PermissionStore for InMemoryPermissionRepository {
    async fn list_by_subject(&self, user_id: UserId) -> Result<Vec<Permission>, StoreError> {
        self.ensure_available()?;
        let records = self.records.read().await;
        Ok(by_creation(
            records
                .values()
                .filter(|p| p.user_id == user_id)
                .cloned()
                .collect(),
        ))
    }
}

#[async_trait]
impl PermissionRepository for InMemoryPermissionRepository {
    async fn save(&self, permission: Permission) -> Result<Permission, StoreError> {
        self.ensure_available()?;
        self.records
            .write()
            .await
            .insert(permission.id, permission.clone());
        Ok(permission)
    }

    async fn update(&self, mut permission: Permission) -> Result<Permission, StoreError> {
        self.ensure_available()?;
        let mut records = self.records.write().await;
        let existing = records.get_mut(&permission.id).ok_or(StoreError::NotFound)?;
        // Owner and creation time are immutable.
        permission.user_id = existing.user_id;
        permission.created_at = existing.created_at;
        permission.updated_at = Utc::now();
        *existing = permission.clone();
        Ok(permission)
    }

    async fn delete(&self, id: PermissionId) -> Result<(), StoreError> {
        self.ensure_available()?;
        self.records
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn find_by_id(&self, id: PermissionId) -> Result<Permission, StoreError> {
        self.ensure_available()?;
        self.records
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn find_all(&self) -> Result<Vec<Permission>, StoreError> {
        self.ensure_available()?;
        Ok(by_creation(self.records.read().await.values().cloned().collect()))
    }
}
