use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use edusys_core::AppError;
use edusys_models::{CreatePermissionDto, Permission, PermissionId, UpdatePermissionDto, UserId};

use crate::middleware::permission::{
    RequirePermissionsCreate, RequirePermissionsDelete, RequirePermissionsRead,
    RequirePermissionsUpdate,
};
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::service::PermissionService;

#[utoipa::path(
    post,
    path = "/api/permissions",
    request_body = CreatePermissionDto,
    responses(
        (status = 201, description = "Permission granted", body = Permission),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Access denied"),
        (status = 422, description = "Validation failed or user does not exist")
    ),
    tag = "Permissions",
    security(("bearer_auth" = []))
)]
pub async fn create_permission(
    _access: RequirePermissionsCreate,
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreatePermissionDto>,
) -> Result<(StatusCode, Json<Permission>), AppError> {
    let permission = PermissionService::create_permission(state.permissions.as_ref(), dto).await?;
    Ok((StatusCode::CREATED, Json(permission)))
}

#[utoipa::path(
    get,
    path = "/api/permissions",
    responses(
        (status = 200, description = "Every permission record", body = Vec<Permission>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Access denied")
    ),
    tag = "Permissions",
    security(("bearer_auth" = []))
)]
pub async fn get_all_permissions(
    _access: RequirePermissionsRead,
    State(state): State<AppState>,
) -> Result<Json<Vec<Permission>>, AppError> {
    let permissions = PermissionService::get_all_permissions(state.permissions.as_ref()).await?;
    Ok(Json(permissions))
}

#[utoipa::path(
    get,
    path = "/api/permissions/{id}",
    params(("id" = String, Path, description = "Permission ID")),
    responses(
        (status = 200, description = "Permission record", body = Permission),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Access denied"),
        (status = 404, description = "Permission not found")
    ),
    tag = "Permissions",
    security(("bearer_auth" = []))
)]
pub async fn get_permission(
    _access: RequirePermissionsRead,
    State(state): State<AppState>,
    Path(id): Path<PermissionId>,
) -> Result<Json<Permission>, AppError> {
    let permission = PermissionService::get_permission(state.permissions.as_ref(), id).await?;
    Ok(Json(permission))
}

#[utoipa::path(
    get,
    path = "/api/permissions/user/{user_id}",
    params(("user_id" = String, Path, description = "Owning user ID")),
    responses(
        (status = 200, description = "Permission records owned by the user", body = Vec<Permission>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Access denied")
    ),
    tag = "Permissions",
    security(("bearer_auth" = []))
)]
pub async fn get_permissions_by_user(
    _access: RequirePermissionsRead,
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<Vec<Permission>>, AppError> {
    let permissions =
        PermissionService::get_permissions_by_user(state.permissions.as_ref(), user_id).await?;
    Ok(Json(permissions))
}

#[utoipa::path(
    patch,
    path = "/api/permissions/{id}",
    params(("id" = String, Path, description = "Permission ID")),
    request_body = UpdatePermissionDto,
    responses(
        (status = 200, description = "Permission updated", body = Permission),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Access denied"),
        (status = 404, description = "Permission not found"),
        (status = 422, description = "Validation failed")
    ),
    tag = "Permissions",
    security(("bearer_auth" = []))
)]
pub async fn update_permission(
    _access: RequirePermissionsUpdate,
    State(state): State<AppState>,
    Path(id): Path<PermissionId>,
    ValidatedJson(dto): ValidatedJson<UpdatePermissionDto>,
) -> Result<Json<Permission>, AppError> {
    let permission =
        PermissionService::update_permission(state.permissions.as_ref(), id, dto).await?;
    Ok(Json(permission))
}

#[utoipa::path(
    delete,
    path = "/api/permissions/{id}",
    params(("id" = String, Path, description = "Permission ID")),
    responses(
        (status = 204, description = "Permission revoked"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Access denied"),
        (status = 404, description = "Permission not found")
    ),
    tag = "Permissions",
    security(("bearer_auth" = []))
)]
pub async fn delete_permission(
    _access: RequirePermissionsDelete,
    State(state): State<AppState>,
    Path(id): Path<PermissionId>,
) -> Result<StatusCode, AppError> {
    PermissionService::delete_permission(state.permissions.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
