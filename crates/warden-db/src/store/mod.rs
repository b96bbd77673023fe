//! The RBAC storage contract.
//!
//! Every mutating method is atomic: it validates, checks the protection
//! policy in [`warden_core::policy`] and writes inside one transaction (or one
//! write-lock section for the in-memory backend). A failed call leaves the
//! store unchanged.
//!
//! Errors use [`AppError`] kinds directly: `NotFound` for unknown ids or
//! names, `DuplicateName` for uniqueness violations, `ProtectedResource` for
//! policy rejections and `AlreadyMember` for a redundant membership.

use async_trait::async_trait;
use warden_core::AppError;
use warden_models::{
    NewUser, Permission, PermissionId, PermissionWithRoles, Role, RoleId, RoleRef,
    RoleWithRelations, User, UserChanges, UserId, UserSummary, UserWithRoles,
};

pub mod memory;
pub mod postgres;

pub type StoreResult<T> = Result<T, AppError>;

#[async_trait]
pub trait RbacStore: Send + Sync {
    // Permissions

    /// Protected identifiers get `is_protected = true` at creation.
    async fn create_permission(&self, name: &str, guard_name: &str) -> StoreResult<Permission>;
    /// Keeps the id, the guard and every grant. Same name is a no-op.
    async fn rename_permission(&self, id: PermissionId, new_name: &str)
    -> StoreResult<Permission>;
    /// Also removes the permission from every role.
    async fn delete_permission(&self, id: PermissionId) -> StoreResult<()>;
    async fn get_permission(&self, id: PermissionId) -> StoreResult<PermissionWithRoles>;
    /// Ordered by name.
    async fn list_permissions(&self) -> StoreResult<Vec<PermissionWithRoles>>;

    // Roles

    async fn create_role(
        &self,
        name: &str,
        description: Option<&str>,
        permission_ids: &[PermissionId],
    ) -> StoreResult<RoleWithRelations>;
    /// `permission_ids` replaces the role's permission set.
    async fn update_role(
        &self,
        id: RoleId,
        name: &str,
        description: Option<&str>,
        permission_ids: &[PermissionId],
    ) -> StoreResult<RoleWithRelations>;
    /// Also removes the role's grants and memberships.
    async fn delete_role(&self, id: RoleId) -> StoreResult<()>;
    async fn get_role(&self, id: RoleId) -> StoreResult<RoleWithRelations>;
    async fn find_role_by_name(&self, name: &str) -> StoreResult<Option<Role>>;
    /// Ordered by name.
    async fn list_roles(&self) -> StoreResult<Vec<RoleWithRelations>>;
    async fn add_member(&self, role_id: RoleId, user_id: UserId) -> StoreResult<()>;
    async fn remove_member(&self, role_id: RoleId, user_id: UserId) -> StoreResult<()>;
    /// Users holding the role, by name.
    async fn list_role_members(&self, role_id: RoleId) -> StoreResult<Vec<UserSummary>>;
    /// Users not holding the role, by name.
    async fn list_available_users(&self, role_id: RoleId) -> StoreResult<Vec<UserSummary>>;

    // Users

    /// Assigns exactly `user.role_name`.
    async fn create_user(&self, user: NewUser) -> StoreResult<UserWithRoles>;
    /// Replaces the user's whole role set with `changes.role_name`.
    async fn update_user(&self, id: UserId, changes: UserChanges) -> StoreResult<UserWithRoles>;
    /// Also removes the user's memberships.
    async fn delete_user(&self, id: UserId) -> StoreResult<()>;
    async fn get_user(&self, id: UserId) -> StoreResult<UserWithRoles>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    /// Newest first.
    async fn list_users(&self) -> StoreResult<Vec<UserWithRoles>>;

    // Authorization reads

    /// Roles held by the user, by name. `NotFound` for an unknown user.
    async fn user_roles(&self, id: UserId) -> StoreResult<Vec<RoleRef>>;
    /// Distinct permission names across the user's roles, sorted.
    /// `NotFound` for an unknown user.
    async fn effective_permissions(&self, id: UserId) -> StoreResult<Vec<String>>;

    async fn health_check(&self) -> StoreResult<()>;
    fn backend_name(&self) -> &'static str;
}

/// Drops repeated ids while keeping the first occurrence order.
pub(crate) fn dedup_ids(ids: &[PermissionId]) -> Vec<PermissionId> {
    let mut seen = std::collections::HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}
