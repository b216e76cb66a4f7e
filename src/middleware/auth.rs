//! Authentication gate.
//!
//! [`authenticate`] runs as a route layer in front of every protected router.
//! It verifies the bearer token and binds an [`AuthenticatedSubject`] into the
//! request extensions. Nothing downstream can construct or alter a subject;
//! they can only read the one bound here.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderValue, header, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use edusys_auth::{TokenCodec, TokenError};
use edusys_models::UserId;

use crate::metrics::track_authentication_failure;
use crate::middleware::error::AccessError;
use crate::state::AppState;

/// The verified identity of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedSubject {
    user_id: UserId,
}

impl AuthenticatedSubject {
    pub(crate) fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }
}

/// Why a request failed authentication. Logged, never returned to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthenticationFailure {
    MissingCredential,
    UnsupportedScheme,
    Token(TokenError),
    InvalidSubject,
}

impl AuthenticationFailure {
    pub fn kind(&self) -> &'static str {
        match self {
            AuthenticationFailure::MissingCredential => "missing_credential",
            AuthenticationFailure::UnsupportedScheme => "unsupported_scheme",
            AuthenticationFailure::Token(e) => e.kind(),
            AuthenticationFailure::InvalidSubject => "invalid_subject",
        }
    }
}

/// Resolves the `Authorization` header to a subject.
pub fn authenticate_header(
    header: Option<&HeaderValue>,
    tokens: &TokenCodec,
) -> Result<AuthenticatedSubject, AuthenticationFailure> {
    let value = header
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(AuthenticationFailure::MissingCredential)?;

    // A bare scheme with nothing after it is a missing token, not a wrong scheme.
    let (scheme, token) = value
        .split_once(char::is_whitespace)
        .unwrap_or((value, ""));
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthenticationFailure::UnsupportedScheme);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthenticationFailure::MissingCredential);
    }

    let claims = tokens.verify(token).map_err(AuthenticationFailure::Token)?;
    let user_id = claims
        .sub
        .parse::<UserId>()
        .map_err(|_| AuthenticationFailure::InvalidSubject)?;

    Ok(AuthenticatedSubject::new(user_id))
}

/// Route layer: `middleware::from_fn_with_state(state.clone(), authenticate)`.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AccessError> {
    match authenticate_header(req.headers().get(header::AUTHORIZATION), &state.tokens) {
        Ok(subject) => {
            debug!(user.id = %subject.user_id(), "Request authenticated");
            req.extensions_mut().insert(subject);
            Ok(next.run(req).await)
        }
        Err(failure) => {
            warn!(
                reason = failure.kind(),
                method = %req.method(),
                path = %req.uri().path(),
                "Authentication failed"
            );
            track_authentication_failure(failure.kind());
            Err(AccessError::Unauthenticated)
        }
    }
}

/// Lets a handler read the subject bound by [`authenticate`].
impl<S> FromRequestParts<S> for AuthenticatedSubject
where
    S: Send + Sync,
{
    type Rejection = AccessError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedSubject>()
            .copied()
            .ok_or(AccessError::Unauthenticated)
    }
}
