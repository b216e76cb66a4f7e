//! Authorization gate.
//!
//! A route declares what it needs with [`require_capability!`], which expands
//! to an extractor that calls [`authorize`] before the handler runs. The check
//! reads the subject's permission records straight from the store on every
//! request.

use std::time::{Duration, Instant};

use tracing::{debug, error, info};

use edusys_core::capabilities::{actions, modules};
use edusys_db::PermissionStore;
use edusys_models::Permission;

use crate::metrics::{track_authorization_decision, track_permission_lookup};
use crate::middleware::auth::AuthenticatedSubject;
use crate::middleware::error::AccessError;

/// The modules and actions a route requires. Both sets are non-empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredCapability {
    pub modules: &'static [&'static str],
    pub actions: &'static [&'static str],
}

impl RequiredCapability {
    pub const fn new(modules: &'static [&'static str], actions: &'static [&'static str]) -> Self {
        assert!(!modules.is_empty(), "a capability needs at least one module");
        assert!(!actions.is_empty(), "a capability needs at least one action");
        Self { modules, actions }
    }

    /// True when this single record grants every required module and action.
    pub fn is_covered_by(&self, permission: &Permission) -> bool {
        self.modules
            .iter()
            .all(|m| permission.modules.iter().any(|granted| granted == m))
            && self
                .actions
                .iter()
                .all(|a| permission.actions.iter().any(|granted| granted == a))
    }
}

/// Decides whether `subject` may exercise `required`.
///
/// Records are never merged: access is granted only when one record covers
/// the whole requirement. A store failure or a lookup slower than
/// `lookup_timeout` denies.
pub async fn authorize<S>(
    store: &S,
    subject: Option<&AuthenticatedSubject>,
    required: RequiredCapability,
    lookup_timeout: Duration,
) -> Result<AuthenticatedSubject, AccessError>
where
    S: PermissionStore + ?Sized,
{
    let subject = *subject.ok_or(AccessError::Unauthenticated)?;
    let user_id = subject.user_id();

    let started = Instant::now();
    let lookup = tokio::time::timeout(lookup_timeout, store.list_by_subject(user_id)).await;
    track_permission_lookup(started.elapsed());

    let permissions = match lookup {
        Ok(Ok(permissions)) => permissions,
        Ok(Err(e)) => {
            error!(user.id = %user_id, error = %e, "Permission lookup failed");
            return Err(deny(AccessError::AuthorizationUnavailable));
        }
        Err(_) => {
            error!(
                user.id = %user_id,
                timeout_ms = lookup_timeout.as_millis() as u64,
                "Permission lookup timed out"
            );
            return Err(deny(AccessError::AuthorizationUnavailable));
        }
    };

    if permissions.iter().any(|p| required.is_covered_by(p)) {
        debug!(user.id = %user_id, modules = ?required.modules, actions = ?required.actions, "Access granted");
        track_authorization_decision("allowed");
        return Ok(subject);
    }

    info!(
        user.id = %user_id,
        modules = ?required.modules,
        actions = ?required.actions,
        records = permissions.len(),
        "Access denied"
    );
    Err(deny(AccessError::Forbidden))
}

fn deny(error: AccessError) -> AccessError {
    track_authorization_decision(error.outcome());
    error
}

/// Declares an extractor that requires a capability.
///
/// ```ignore
/// require_capability!(RequireReportsExport, ["reports"], ["read", "export"]);
///
/// async fn export(RequireReportsExport(subject): RequireReportsExport) { /* ... */ }
/// ```
#[macro_export]
macro_rules! require_capability {
    ($name:ident, [$($module:expr),+ $(,)?], [$($action:expr),+ $(,)?]) => {
        #[derive(Debug, Clone, Copy)]
        pub struct $name(pub $crate::middleware::auth::AuthenticatedSubject);

        impl $name {
            pub const REQUIRED: $crate::middleware::permission::RequiredCapability =
                $crate::middleware::permission::RequiredCapability::new(
                    &[$($module),+],
                    &[$($action),+],
                );
        }

        impl axum::extract::FromRequestParts<$crate::state::AppState> for $name {
            type Rejection = $crate::middleware::error::AccessError;

            async fn from_request_parts(
                parts: &mut axum::http::request::Parts,
                state: &$crate::state::AppState,
            ) -> Result<Self, Self::Rejection> {
                $crate::middleware::permission::authorize(
                    state.permissions.as_ref(),
                    parts
                        .extensions
                        .get::<$crate::middleware::auth::AuthenticatedSubject>(),
                    Self::REQUIRED,
                    state.authorization.lookup_timeout,
                )
                .await
                .map($name)
            }
        }
    };
}

// Users
require_capability!(RequireUsersCreate, [modules::USERS], [actions::CREATE]);
require_capability!(RequireUsersRead, [modules::USERS], [actions::READ]);
require_capability!(RequireUsersUpdate, [modules::USERS], [actions::UPDATE]);
require_capability!(RequireUsersDelete, [modules::USERS], [actions::DELETE]);

// Schools
require_capability!(RequireSchoolsCreate, [modules::SCHOOLS], [actions::CREATE]);
require_capability!(RequireSchoolsRead, [modules::SCHOOLS], [actions::READ]);
require_capability!(RequireSchoolsUpdate, [modules::SCHOOLS], [actions::UPDATE]);
require_capability!(RequireSchoolsDelete, [modules::SCHOOLS], [actions::DELETE]);

// Students
require_capability!(RequireStudentsCreate, [modules::STUDENTS], [actions::CREATE]);
require_capability!(RequireStudentsRead, [modules::STUDENTS], [actions::READ]);
require_capability!(RequireStudentsUpdate, [modules::STUDENTS], [actions::UPDATE]);
require_capability!(RequireStudentsDelete, [modules::STUDENTS], [actions::DELETE]);

// Permissions
require_capability!(RequirePermissionsCreate, [modules::PERMISSIONS], [actions::CREATE]);
require_capability!(RequirePermissionsRead, [modules::PERMISSIONS], [actions::READ]);
require_capability!(RequirePermissionsUpdate, [modules::PERMISSIONS], [actions::UPDATE]);
require_capability!(RequirePermissionsDelete, [modules::PERMISSIONS], [actions::DELETE]);
