use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use edusys_core::{PaginationMeta, PaginationParams};
use edusys_models::{
    CreatePermissionDto, CreateSchoolDto, CreateStudentDto, CreateUserDto, LoginRequest,
    LoginResponse, PaginatedSchoolsResponse, PaginatedStudentsResponse, PaginatedUsersResponse,
    Permission, ProfileResponse, School, Shift, Student, UpdatePermissionDto, UpdateSchoolDto,
    UpdateStudentDto, UpdateUserDto, User,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::login,
        crate::modules::auth::controller::me,
        crate::modules::users::controller::create_user,
        crate::modules::users::controller::list_users,
        crate::modules::users::controller::get_user,
        crate::modules::users::controller::update_user,
        crate::modules::users::controller::delete_user,
        crate::modules::schools::controller::create_school,
        crate::modules::schools::controller::get_all_schools,
        crate::modules::schools::controller::get_school,
        crate::modules::schools::controller::update_school,
        crate::modules::schools::controller::delete_school,
        crate::modules::students::controller::create_student,
        crate::modules::students::controller::get_all_students,
        crate::modules::students::controller::get_student,
        crate::modules::students::controller::update_student,
        crate::modules::students::controller::delete_student,
        crate::modules::permissions::controller::create_permission,
        crate::modules::permissions::controller::get_all_permissions,
        crate::modules::permissions::controller::get_permission,
        crate::modules::permissions::controller::get_permissions_by_user,
        crate::modules::permissions::controller::update_permission,
        crate::modules::permissions::controller::delete_permission,
    ),
    components(
        schemas(
            LoginRequest,
            LoginResponse,
            ProfileResponse,
            User,
            CreateUserDto,
            UpdateUserDto,
            PaginatedUsersResponse,
            School,
            CreateSchoolDto,
            UpdateSchoolDto,
            PaginatedSchoolsResponse,
            Student,
            Shift,
            CreateStudentDto,
            UpdateStudentDto,
            PaginatedStudentsResponse,
            Permission,
            CreatePermissionDto,
            UpdatePermissionDto,
            PaginationMeta,
            PaginationParams,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Login and current-user endpoints"),
        (name = "Users", description = "User accounts"),
        (name = "Schools", description = "Schools"),
        (name = "Students", description = "Students and their guardians"),
        (name = "Permissions", description = "Per-user grants of module actions")
    ),
    info(
        title = "edusys API",
        version = "0.1.0",
        description = "School administration API with permission-based access control.",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_protected_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/auth/login",
            "/api/auth/me",
            "/api/users/{id}",
            "/api/schools/{id}",
            "/api/students/{id}",
            "/api/permissions/user/{user_id}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn test_bearer_scheme_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
