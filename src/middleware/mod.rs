//! Access control for protected routes.
//!
//! - [`auth`]: the authentication gate and the [`auth::AuthenticatedSubject`] it binds
//! - [`permission`]: the authorization gate and capability extractors
//! - [`error`]: the two client-visible failure shapes
//!
//! # Request flow
//!
//! 1. Client sends `Authorization: Bearer <token>`
//! 2. The [`auth::authenticate`] route layer verifies the token and stores the
//!    subject in the request extensions, or answers 401
//! 3. A capability extractor such as [`permission::RequireSchoolsRead`] loads
//!    the subject's permission records and answers 403 unless one record
//!    covers the requirement
//! 4. The handler runs
//!
//! # Example
//!
//! ```ignore
//! use crate::middleware::permission::RequireSchoolsCreate;
//!
//! async fn create_school(
//!     RequireSchoolsCreate(subject): RequireSchoolsCreate,
//!     State(state): State<AppState>,
//!     ValidatedJson(dto): ValidatedJson<CreateSchoolDto>,
//! ) -> Result<Json<School>, AppError> {
//!     // Runs only for subjects holding schools:create
//! }
//! ```

pub mod auth;
pub mod error;
pub mod permission;
