use anyhow::anyhow;
use axum::http::StatusCode;
use tracing::{error, info, instrument, warn};

use edusys_core::AppError;
use edusys_core::capabilities::modules;
use edusys_db::{PermissionRepository, StoreError};
use edusys_models::{CreatePermissionDto, Permission, PermissionId, UpdatePermissionDto, UserId};

use crate::metrics::track_record_created;

fn store_error(e: StoreError) -> AppError {
    match e {
        StoreError::NotFound => AppError::not_found(anyhow!("Permission not found")),
        StoreError::Unavailable => {
            error!("Permission store unavailable");
            AppError::new(StatusCode::SERVICE_UNAVAILABLE, anyhow!("Permission store unavailable"))
        }
        StoreError::Database(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() => {
            warn!("Permission granted to unknown user");
            AppError::unprocessable(anyhow!("User does not exist"))
        }
        StoreError::Database(e) => {
            error!(error = %e, "Database error in permission store");
            AppError::database(e)
        }
    }
}

/// Administrative operations on permission records. Changes take effect on
/// the next authorization check; nothing is cached.
pub struct PermissionService;

impl PermissionService {
    #[instrument(skip(repo, dto), fields(user.id = %dto.user_id))]
    pub async fn create_permission(
        repo: &dyn PermissionRepository,
        dto: CreatePermissionDto,
    ) -> Result<Permission, AppError> {
        let permission = repo
            .save(Permission::new(dto))
            .await
            .map_err(store_error)?;

        track_record_created(modules::PERMISSIONS);
        info!(
            permission.id = %permission.id,
            modules = ?permission.modules,
            actions = ?permission.actions,
            "Permission granted"
        );

        Ok(permission)
    }

    #[instrument(skip(repo))]
    pub async fn get_all_permissions(
        repo: &dyn PermissionRepository,
    ) -> Result<Vec<Permission>, AppError> {
        repo.find_all().await.map_err(store_error)
    }

    #[instrument(skip(repo))]
    pub async fn get_permission(
        repo: &dyn PermissionRepository,
        id: PermissionId,
    ) -> Result<Permission, AppError> {
        repo.find_by_id(id).await.map_err(store_error)
    }

    #[instrument(skip(repo))]
    pub async fn get_permissions_by_user(
        repo: &dyn PermissionRepository,
        user_id: UserId,
    ) -> Result<Vec<Permission>, AppError> {
        repo.list_by_subject(user_id).await.map_err(store_error)
    }

    #[instrument(skip(repo, dto))]
    pub async fn update_permission(
        repo: &dyn PermissionRepository,
        id: PermissionId,
        dto: UpdatePermissionDto,
    ) -> Result<Permission, AppError> {
        let mut permission = repo.find_by_id(id).await.map_err(store_error)?;
        permission.apply(dto);

        let updated = repo.update(permission).await.map_err(store_error)?;
        info!(permission.id = %id, "Permission updated");

        Ok(updated)
    }

    /// Confirms the record exists before removing it, so an unknown id is a
    /// 404 rather than a silent no-op.
    #[instrument(skip(repo))]
    pub async fn delete_permission(
        repo: &dyn PermissionRepository,
        id: PermissionId,
    ) -> Result<(), AppError> {
        repo.find_by_id(id).await.map_err(store_error)?;
        repo.delete(id).await.map_err(store_error)?;
        info!(permission.id = %id, "Permission revoked");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edusys_db::InMemoryPermissionRepository;

    fn dto(user_id: UserId) -> CreatePermissionDto {
        CreatePermissionDto {
            user_id,
            modules: vec!["students".into(), "schools".into()],
            actions: vec!["read".into()],
            level: "teacher".into(),
            description: "class access".into(),
        }
    }

    #[tokio::test]
    async fn test_create_normalises_and_stores() {
        let repo = InMemoryPermissionRepository::new();
        let user = UserId::new();

        let created = PermissionService::create_permission(&repo, dto(user)).await.unwrap();
        assert_eq!(created.modules, vec!["schools", "students"]);

        let listed = PermissionService::get_permissions_by_user(&repo, user).await.unwrap();
        assert_eq!(listed, vec![created]);
    }

    #[tokio::test]
    async fn test_update_is_partial() {
        let repo = InMemoryPermissionRepository::new();
        let created = PermissionService::create_permission(&repo, dto(UserId::new()))
            .await
            .unwrap();

        let updated = PermissionService::update_permission(
            &repo,
            created.id,
            UpdatePermissionDto {
                level: Some("coordinator".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.level, "coordinator");
        assert_eq!(updated.modules, created.modules);
        assert_eq!(updated.actions, created.actions);
    }

    #[tokio::test]
    async fn test_unknown_ids_are_404() {
        let repo = InMemoryPermissionRepository::new();
        let id = PermissionId::new();

        let err = PermissionService::get_permission(&repo, id).await.unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);

        let err = PermissionService::delete_permission(&repo, id).await.unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);

        let err = PermissionService::update_permission(&repo, id, UpdatePermissionDto::default())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_removes_record() {
        let repo = InMemoryPermissionRepository::new();
        let user = UserId::new();
        let created = PermissionService::create_permission(&repo, dto(user)).await.unwrap();

        PermissionService::delete_permission(&repo, created.id).await.unwrap();

        assert!(
            PermissionService::get_permissions_by_user(&repo, user)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_outage_is_503() {
        let repo = InMemoryPermissionRepository::new();
        repo.set_unavailable(true);

        let err = PermissionService::get_all_permissions(&repo).await.unwrap_err();
        assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
