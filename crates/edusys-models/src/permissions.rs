//! Permission records.
//!
//! A [`Permission`] grants its owner every listed action on every listed
//! module. A user may own any number of records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use edusys_core::capabilities::normalize_names;

use crate::ids::{PermissionId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Permission {
    pub id: PermissionId,
    pub user_id: UserId,
    pub modules: Vec<String>,
    pub actions: Vec<String>,
    pub level: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Permission {
    /// Builds a new record from a validated DTO. Module and action lists are
    /// normalised to sorted, duplicate-free sets.
    pub fn new(dto: CreatePermissionDto) -> Self {
        let now = Utc::now();
        Self {
            id: PermissionId::new(),
            user_id: dto.user_id,
            modules: normalize_names(dto.modules),
            actions: normalize_names(dto.actions),
            level: dto.level.trim().to_string(),
            description: dto.description.trim().to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a partial update. Absent fields are left untouched.
    pub fn apply(&mut self, dto: UpdatePermissionDto) {
        if let Some(modules) = dto.modules {
            self.modules = normalize_names(modules);
        }
        if let Some(actions) = dto.actions {
            self.actions = normalize_names(actions);
        }
        if let Some(level) = dto.level {
            self.level = level.trim().to_string();
        }
        if let Some(description) = dto.description {
            self.description = description;
        }
        self.updated_at = Utc::now();
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

fn names_not_blank(names: &[String]) -> Result<(), ValidationError> {
    if names.iter().any(|n| n.trim().is_empty()) {
        let mut err = ValidationError::new("blank_name");
        err.message = Some("names cannot be blank".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreatePermissionDto {
    pub user_id: UserId,
    #[validate(
        length(min = 1, message = "modules cannot be empty"),
        custom(function = "names_not_blank")
    )]
    pub modules: Vec<String>,
    #[validate(
        length(min = 1, message = "actions cannot be empty"),
        custom(function = "names_not_blank")
    )]
    pub actions: Vec<String>,
    #[validate(custom(function = "not_blank", message = "level cannot be empty"))]
    pub level: String,
    #[validate(custom(function = "not_blank", message = "description cannot be empty"))]
    pub description: String,
}

/// Partial update. `user_id` is not updatable.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdatePermissionDto {
    #[validate(
        length(min = 1, message = "modules cannot be empty"),
        custom(function = "names_not_blank")
    )]
    pub modules: Option<Vec<String>>,
    #[validate(
        length(min = 1, message = "actions cannot be empty"),
        custom(function = "names_not_blank")
    )]
    pub actions: Option<Vec<String>>,
    #[validate(custom(function = "not_blank", message = "level cannot be empty"))]
    pub level: Option<String>,
    pub description: Option<String>,
}
