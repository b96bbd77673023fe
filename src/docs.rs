use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use warden_core::{ErrorKind, ErrorResponse};
use warden_models::{
    AddMemberDto, CreatePermissionDto, CreateRoleDto, CreateUserDto, LoginRequest, LoginResponse,
    MeResponse, Permission, PermissionWithRoles, RenamePermissionDto, Role, RoleMembers, RoleRef,
    RoleWithRelations, UpdateRoleDto, UpdateUserDto, UserPermissions, UserSummary, UserWithRoles,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::login_user,
        crate::modules::auth::controller::get_me,
        crate::modules::permissions::controller::list_permissions,
        crate::modules::permissions::controller::create_permission,
        crate::modules::permissions::controller::get_permission,
        crate::modules::permissions::controller::rename_permission,
        crate::modules::permissions::controller::delete_permission,
        crate::modules::roles::controller::list_roles,
        crate::modules::roles::controller::create_role,
        crate::modules::roles::controller::get_role,
        crate::modules::roles::controller::update_role,
        crate::modules::roles::controller::delete_role,
        crate::modules::roles::controller::list_members,
        crate::modules::roles::controller::add_member,
        crate::modules::roles::controller::remove_member,
        crate::modules::users::controller::list_users,
        crate::modules::users::controller::create_user,
        crate::modules::users::controller::get_user,
        crate::modules::users::controller::update_user,
        crate::modules::users::controller::delete_user,
        crate::modules::authorization::controller::get_user_permissions,
    ),
    components(
        schemas(
            ErrorKind,
            ErrorResponse,
            LoginRequest,
            LoginResponse,
            MeResponse,
            Permission,
            PermissionWithRoles,
            CreatePermissionDto,
            RenamePermissionDto,
            Role,
            RoleRef,
            RoleWithRelations,
            RoleMembers,
            CreateRoleDto,
            UpdateRoleDto,
            AddMemberDto,
            UserSummary,
            UserWithRoles,
            UserPermissions,
            CreateUserDto,
            UpdateUserDto,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Login and current user"),
        (name = "Permissions", description = "Permission catalogue"),
        (name = "Roles", description = "Roles, their permissions and members"),
        (name = "Users", description = "User management"),
        (name = "Authorization", description = "Effective permissions")
    ),
    info(
        title = "Warden API",
        version = "0.1.0",
        description = "Role-based access control admin API built with Rust, Axum, and PostgreSQL.",
        license(
            name = "MIT"
        )
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
