//! # Warden Models
//!
//! Entities, DTOs and typed ids for the RBAC domain.
//!
//! - [`ids`]: `PermissionId`, `RoleId`, `UserId`
//! - [`permissions`]: permission records and their DTOs
//! - [`roles`]: roles, role membership views and DTOs
//! - [`users`]: users, store inputs and DTOs
//! - [`auth`]: login and current-user payloads

pub mod auth;
pub mod ids;
pub mod permissions;
pub mod roles;
pub mod users;
mod validation;

pub use auth::{LoginRequest, LoginResponse, MeResponse};
pub use ids::{PermissionId, RoleId, UserId};
pub use permissions::{
    CreatePermissionDto, Permission, PermissionWithRoles, RenamePermissionDto,
};
pub use roles::{
    AddMemberDto, CreateRoleDto, Role, RoleMembers, RoleRef, RoleWithRelations, UpdateRoleDto,
};
pub use users::{
    CreateUserDto, NewUser, UpdateUserDto, User, UserChanges, UserPermissions, UserSummary,
    UserWithRoles,
};
