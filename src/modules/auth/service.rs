use anyhow::anyhow;
use sqlx::PgPool;
use tracing::{info, instrument, warn};

use edusys_auth::TokenCodec;
use edusys_core::{AppError, verify_password};
use edusys_db::PermissionRepository;
use edusys_models::{LoginRequest, LoginResponse, ProfileResponse, UserCredentials, UserId};

use crate::metrics::{track_login_failure, track_login_success, track_token_issued};
use crate::modules::users::service::UserService;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

pub struct AuthService;

impl AuthService {
    /// Exchanges an email and password for a session token. Unknown email and
    /// wrong password produce the same error.
    #[instrument(skip(db, tokens, dto), fields(db.operation = "SELECT", db.table = "users"))]
    pub async fn login(
        db: &PgPool,
        tokens: &TokenCodec,
        dto: LoginRequest,
    ) -> Result<LoginResponse, AppError> {
        let credentials = sqlx::query_as::<_, UserCredentials>(
            "SELECT id, email, password FROM users WHERE email = $1",
        )
        .bind(dto.email.to_lowercase())
        .fetch_optional(db)
        .await?;

        let Some(credentials) = credentials else {
            warn!("Login attempt for unknown email");
            track_login_failure("unknown_email");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        };

        if !verify_password(&dto.password, &credentials.password)? {
            warn!(user.id = %credentials.id, "Login attempt with wrong password");
            track_login_failure("wrong_password");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        }

        let access_token = tokens.issue(&credentials.id.to_string())?;

        track_login_success();
        track_token_issued();
        info!(user.id = %credentials.id, "User logged in");

        Ok(LoginResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: tokens.validity().num_seconds(),
        })
    }

    /// The caller's account and every permission record they currently own.
    #[instrument(skip(db, permissions))]
    pub async fn profile(
        db: &PgPool,
        permissions: &dyn PermissionRepository,
        user_id: UserId,
    ) -> Result<ProfileResponse, AppError> {
        let user = UserService::get_user(db, user_id).await?;
        let permissions = permissions.list_by_subject(user_id).await.map_err(|e| {
            AppError::internal(anyhow!("Failed to load permissions: {}", e))
        })?;

        Ok(ProfileResponse { user, permissions })
    }
}
