use axum::{Json, extract::State};

use edusys_core::AppError;
use edusys_models::{LoginRequest, LoginResponse, ProfileResponse};

use crate::middleware::auth::AuthenticatedSubject;
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::service::AuthService;

/// Log in and receive a session token
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Malformed request body"),
        (status = 401, description = "Invalid email or password"),
        (status = 422, description = "Validation failed")
    ),
    tag = "Authentication"
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = AuthService::login(&state.db, &state.tokens, dto).await?;
    Ok(Json(response))
}

/// The authenticated user's profile and permission records
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = ProfileResponse),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "User no longer exists")
    ),
    tag = "Authentication",
    security(("bearer_auth" = []))
)]
pub async fn me(
    subject: AuthenticatedSubject,
    State(state): State<AppState>,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile =
        AuthService::profile(&state.db, state.permissions.as_ref(), subject.user_id()).await?;
    Ok(Json(profile))
}
