use anyhow::{Context, anyhow};
use sqlx::PgPool;
use validator::Validate;

use edusys_core::capabilities::{actions, modules};
use edusys_core::hash_password;
use edusys_db::{PermissionRepository, PgPermissionRepository};
use edusys_models::{CreatePermissionDto, CreateUserDto, Permission, PermissionId, UserId};

pub const ADMIN_LEVEL: &str = "admin";

#[derive(Debug, Clone)]
pub struct CreatedAdmin {
    pub user_id: UserId,
    pub permission_id: PermissionId,
}

/// The permission record handed to a bootstrap administrator: every module,
/// every action.
pub fn full_access_grant(user_id: UserId) -> CreatePermissionDto {
    CreatePermissionDto {
        user_id,
        modules: modules::ALL.iter().map(|m| m.to_string()).collect(),
        actions: actions::ALL.iter().map(|a| a.to_string()).collect(),
        level: ADMIN_LEVEL.to_string(),
        description: "Bootstrap administrator".to_string(),
    }
}

/// Creates a user and grants it full access in one transaction: either both
/// rows exist afterwards or neither does.
pub async fn create_admin(pool: &PgPool, admin: CreateUserDto) -> anyhow::Result<CreatedAdmin> {
    admin
        .validate()
        .map_err(|e| anyhow!("Invalid administrator details: {}", e))?;

    let hashed = hash_password(&admin.password).map_err(|e| e.error)?;

    let mut tx = pool.begin().await.context("Failed to start transaction")?;

    let user_id: UserId = sqlx::query_scalar(
        "INSERT INTO users (id, name, surname, nickname, age, email, password)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING id",
    )
    .bind(UserId::new())
    .bind(&admin.name)
    .bind(&admin.surname)
    .bind(&admin.nickname)
    .bind(admin.age)
    .bind(admin.email.to_lowercase())
    .bind(&hashed)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(db_err) = &e
            && db_err.is_unique_violation()
        {
            return anyhow!("A user with email {} already exists", admin.email);
        }
        anyhow::Error::from(e).context("Failed to insert user")
    })?;

    let permission =
        PgPermissionRepository::insert(&mut *tx, &Permission::new(full_access_grant(user_id)))
            .await
            .context("Failed to grant permissions")?;

    tx.commit().await.context("Failed to commit administrator")?;

    Ok(CreatedAdmin {
        user_id,
        permission_id: permission.id,
    })
}

/// Grants an additional permission record to an existing user, found by email.
pub async fn grant(
    pool: &PgPool,
    email: &str,
    modules: Vec<String>,
    actions: Vec<String>,
    level: String,
    description: String,
) -> anyhow::Result<Permission> {
    let user_id: UserId = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
        .bind(email.to_lowercase())
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| anyhow!("No user with email {}", email))?;

    let dto = CreatePermissionDto {
        user_id,
        modules,
        actions,
        level,
        description,
    };
    dto.validate()
        .map_err(|e| anyhow!("Invalid permission: {}", e))?;

    let repo = PgPermissionRepository::new(pool.clone());
    Ok(repo.save(Permission::new(dto)).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_access_grant_covers_everything() {
        let grant = full_access_grant(UserId::new());
        assert!(grant.validate().is_ok());

        let permission = Permission::new(grant);
        for module in modules::ALL {
            assert!(permission.modules.iter().any(|m| m == module));
        }
        for action in actions::ALL {
            assert!(permission.actions.iter().any(|a| a == action));
        }
        assert_eq!(permission.level, ADMIN_LEVEL);
    }
}
