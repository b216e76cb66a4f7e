use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use edusys_core::PaginationMeta;
use edusys_core::pagination::PaginationParams;

use crate::ids::SchoolId;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct School {
    pub id: SchoolId,
    pub name: String,
    pub code: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub phone_number: String,
    pub email: String,
    pub is_active: bool,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateSchoolDto {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "code is required"))]
    pub code: String,
    #[validate(length(min = 1, message = "address is required"))]
    pub address: String,
    #[validate(length(min = 1, message = "city is required"))]
    pub city: String,
    #[validate(length(min = 1, message = "state is required"))]
    pub state: String,
    #[validate(length(min = 1, message = "zip_code is required"))]
    pub zip_code: String,
    #[validate(length(min = 1, message = "country is required"))]
    pub country: String,
    #[validate(length(min = 1, message = "phone_number is required"))]
    pub phone_number: String,
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
}

fn default_true() -> bool {
    true
}

/// Partial update; a supplied email must still be valid.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateSchoolDto {
    #[validate(length(min = 1, message = "name cannot be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "code cannot be empty"))]
    pub code: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub phone_number: Option<String>,
    #[validate(email(message = "email must be a valid email address"))]
    pub email: Option<String>,
    pub is_active: Option<bool>,
    pub description: Option<String>,
}

impl School {
    pub fn apply(&mut self, dto: UpdateSchoolDto) {
        macro_rules! set {
            ($($field:ident),* $(,)?) => {
                $(if let Some(value) = dto.$field { self.$field = value; })*
            };
        }
        set!(
            name,
            code,
            address,
            city,
            state,
            zip_code,
            country,
            phone_number,
            email,
            is_active,
            description,
        );
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchoolFilterParams {
    /// Partial, case-insensitive match on the school name.
    pub name: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedSchoolsResponse {
    pub data: Vec<School>,
    pub meta: PaginationMeta,
}
