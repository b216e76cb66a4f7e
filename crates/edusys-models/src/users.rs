//! User accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use edusys_core::PaginationMeta;
use edusys_core::pagination::PaginationParams;

use crate::ids::UserId;

/// A user as exposed by the API. The password hash never leaves the service
/// layer.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub surname: String,
    pub nickname: String,
    pub age: i32,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Login lookup row.
#[derive(Debug, Clone, FromRow)]
pub struct UserCredentials {
    pub id: UserId,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUserDto {
    #[validate(length(min = 2, max = 100, message = "name must be between 2 and 100 characters"))]
    pub name: String,
    #[validate(length(min = 2, max = 100, message = "surname must be between 2 and 100 characters"))]
    pub surname: String,
    #[validate(length(min = 2, max = 50, message = "nickname must be between 2 and 50 characters"))]
    pub nickname: String,
    #[validate(range(min = 1, max = 130, message = "age must be between 1 and 130"))]
    pub age: i32,
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUserDto {
    #[validate(length(min = 2, max = 100, message = "name must be between 2 and 100 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 2, max = 100, message = "surname must be between 2 and 100 characters"))]
    pub surname: Option<String>,
    #[validate(length(min = 2, max = 50, message = "nickname must be between 2 and 50 characters"))]
    pub nickname: Option<String>,
    #[validate(range(min = 1, max = 130, message = "age must be between 1 and 130"))]
    pub age: Option<i32>,
    #[validate(email(message = "email must be a valid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserFilterParams {
    pub email: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedUsersResponse {
    pub data: Vec<User>,
    pub meta: PaginationMeta,
}
