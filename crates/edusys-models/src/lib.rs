//! # edusys models
//!
//! Entities, request/response DTOs and typed identifiers.
//!
//! - [`ids`]: `Uuid` newtypes per entity
//! - [`permissions`]: permission records granting modules and actions to a user
//! - [`users`]: user accounts
//! - [`schools`]: schools
//! - [`students`]: students, their guardian and enrollment
//! - [`auth`]: login and profile payloads
//!
//! Every request DTO derives [`validator::Validate`]; the HTTP layer rejects
//! invalid payloads with 422 before a service is called.

pub mod auth;
pub mod ids;
pub mod permissions;
pub mod schools;
pub mod students;
pub mod users;

pub use auth::{LoginRequest, LoginResponse, ProfileResponse};
pub use ids::{PermissionId, SchoolId, StudentId, UserId};
pub use permissions::{CreatePermissionDto, Permission, UpdatePermissionDto};
pub use schools::{
    CreateSchoolDto, PaginatedSchoolsResponse, School, SchoolFilterParams, UpdateSchoolDto,
};
pub use students::{
    CreateStudentDto, PaginatedStudentsResponse, Shift, Student, StudentFilterParams,
    UpdateStudentDto,
};
pub use users::{
    CreateUserDto, PaginatedUsersResponse, UpdateUserDto, User, UserCredentials, UserFilterParams,
};
