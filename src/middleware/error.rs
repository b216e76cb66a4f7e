use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Terminal outcomes of the access pipeline.
///
/// Only two messages ever reach the client: every authentication failure is
/// "Not authenticated" and every authorization failure is "Access denied".
/// The specific cause is logged where the decision is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AccessError {
    /// No verified subject is bound to the request.
    #[error("not authenticated")]
    Unauthenticated,
    /// The subject holds no record covering the required capability.
    #[error("forbidden")]
    Forbidden,
    /// Permissions could not be read in time, so the request is denied.
    #[error("authorization unavailable")]
    AuthorizationUnavailable,
}

impl AccessError {
    pub fn status(&self) -> StatusCode {
        match self {
            AccessError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AccessError::Forbidden | AccessError::AuthorizationUnavailable => {
                StatusCode::FORBIDDEN
            }
        }
    }

    /// Label used in logs and metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            AccessError::Unauthenticated => "unauthenticated",
            AccessError::Forbidden => "forbidden",
            AccessError::AuthorizationUnavailable => "unavailable",
        }
    }
}

impl IntoResponse for AccessError {
    fn into_response(self) -> Response {
        let message = match self {
            AccessError::Unauthenticated => "Not authenticated",
            AccessError::Forbidden | AccessError::AuthorizationUnavailable => "Access denied",
        };

        (self.status(), Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_of(error: AccessError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_denials_are_indistinguishable_to_clients() {
        let forbidden = body_of(AccessError::Forbidden).await;
        let unavailable = body_of(AccessError::AuthorizationUnavailable).await;

        assert_eq!(forbidden.0, StatusCode::FORBIDDEN);
        assert_eq!(forbidden, unavailable);
    }

    #[tokio::test]
    async fn test_unauthenticated_is_401() {
        let (status, body) = body_of(AccessError::Unauthenticated).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Not authenticated");
    }
}
