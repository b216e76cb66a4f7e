use anyhow::{Context, anyhow};
use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, error, info, instrument, warn};

use edusys_core::capabilities::modules;
use edusys_core::{AppError, PaginationMeta, hash_password};
use edusys_models::{
    CreateUserDto, PaginatedUsersResponse, UpdateUserDto, User, UserFilterParams, UserId,
};

use crate::metrics::track_record_created;

const USER_COLUMNS: &str = "id, name, surname, nickname, age, email, created_at, updated_at";

fn map_write_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e
        && db_err.is_unique_violation()
    {
        warn!("Email already registered");
        return AppError::conflict(anyhow!("Email already registered"));
    }
    error!(error = %e, "Database error writing user");
    AppError::from(e)
}

pub struct UserService;

impl UserService {
    #[instrument(skip(db, dto), fields(db.operation = "INSERT", db.table = "users"))]
    pub async fn create_user(db: &PgPool, dto: CreateUserDto) -> Result<User, AppError> {
        let hashed = hash_password(&dto.password)?;
        let now = Utc::now();

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (id, name, surname, nickname, age, email, password, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(UserId::new())
        .bind(&dto.name)
        .bind(&dto.surname)
        .bind(&dto.nickname)
        .bind(dto.age)
        .bind(dto.email.to_lowercase())
        .bind(&hashed)
        .bind(now)
        .fetch_one(db)
        .await
        .map_err(map_write_error)?;

        track_record_created(modules::USERS);
        info!(user.id = %user.id, "User created");

        Ok(user)
    }

    #[instrument(skip(db, filters), fields(db.operation = "SELECT", db.table = "users"))]
    pub async fn get_users(
        db: &PgPool,
        filters: UserFilterParams,
    ) -> Result<PaginatedUsersResponse, AppError> {
        let email = filters.email.as_ref().map(|e| format!("%{}%", e.to_lowercase()));

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE ($1::TEXT IS NULL OR email LIKE $1)",
        )
        .bind(&email)
        .fetch_one(db)
        .await
        .context("Failed to count users")?;

        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users
             WHERE ($1::TEXT IS NULL OR email LIKE $1)
             ORDER BY created_at DESC, id
             LIMIT $2 OFFSET $3"
        ))
        .bind(&email)
        .bind(filters.pagination.limit())
        .bind(filters.pagination.offset())
        .fetch_all(db)
        .await
        .context("Failed to fetch users")?;

        debug!(total, returned = users.len(), "Users fetched");

        Ok(PaginatedUsersResponse {
            data: users,
            meta: PaginationMeta::new(&filters.pagination, total),
        })
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "users"))]
    pub async fn get_user(db: &PgPool, id: UserId) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("User not found")))
    }

    /// Partial update. Absent fields keep their stored value; a new password
    /// is hashed before it is written.
    #[instrument(skip(db, dto), fields(db.operation = "UPDATE", db.table = "users"))]
    pub async fn update_user(db: &PgPool, id: UserId, dto: UpdateUserDto) -> Result<User, AppError> {
        let hashed = dto.password.as_deref().map(hash_password).transpose()?;

        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users
             SET name = COALESCE($2, name),
                 surname = COALESCE($3, surname),
                 nickname = COALESCE($4, nickname),
                 age = COALESCE($5, age),
                 email = COALESCE($6, email),
                 password = COALESCE($7, password),
                 updated_at = $8
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(&dto.name)
        .bind(&dto.surname)
        .bind(&dto.nickname)
        .bind(dto.age)
        .bind(dto.email.as_ref().map(|e| e.to_lowercase()))
        .bind(&hashed)
        .bind(Utc::now())
        .fetch_optional(db)
        .await
        .map_err(map_write_error)?
        .ok_or_else(|| AppError::not_found(anyhow!("User not found")))?;

        info!(user.id = %id, "User updated");

        Ok(user)
    }

    /// Deleting a user removes their permission records with them.
    #[instrument(skip(db), fields(db.operation = "DELETE", db.table = "users"))]
    pub async fn delete_user(db: &PgPool, id: UserId) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("User not found")));
        }

        info!(user.id = %id, "User deleted");

        Ok(())
    }
}
