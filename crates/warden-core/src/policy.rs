//! Authorization policy.
//!
//! The protection invariants of the RBAC model live here and nowhere else.
//! Store backends call these checks inside the same transaction (or lock) as
//! the mutation they guard, so a check cannot go stale before the write.
//!
//! A permission or role counts as protected when its immutable
//! `is_protected` flag is set, or when its current name is one of the
//! protected identifiers in [`crate::permissions`].

use anyhow::anyhow;

use crate::errors::AppError;
use crate::permissions::{is_protected_permission_name, is_protected_role_name};

pub fn permission_is_protected(name: &str, is_protected: bool) -> bool {
    is_protected || is_protected_permission_name(name)
}

pub fn role_is_protected(name: &str, is_protected: bool) -> bool {
    is_protected || is_protected_role_name(name)
}

/// `manage roles` and `manage permissions` are never deleted.
pub fn ensure_permission_deletable(name: &str, is_protected: bool) -> Result<(), AppError> {
    if permission_is_protected(name, is_protected) {
        tracing::warn!(permission = %name, "rejected deletion of protected permission");
        return Err(AppError::protected(anyhow!(
            "Cannot delete critical system permission '{}'",
            name
        )));
    }
    Ok(())
}

/// `super-admin` is never deleted.
pub fn ensure_role_deletable(name: &str, is_protected: bool) -> Result<(), AppError> {
    if role_is_protected(name, is_protected) {
        tracing::warn!(role = %name, "rejected deletion of protected role");
        return Err(AppError::protected(anyhow!("Cannot delete the '{}' role", name)));
    }
    Ok(())
}

/// The protected role keeps its name; super-admin checks match on it.
pub fn ensure_role_renamable(
    current_name: &str,
    is_protected: bool,
    new_name: &str,
) -> Result<(), AppError> {
    if role_is_protected(current_name, is_protected) && current_name != new_name {
        tracing::warn!(role = %current_name, new_name = %new_name, "rejected rename of protected role");
        return Err(AppError::protected(anyhow!(
            "Cannot rename the '{}' role",
            current_name
        )));
    }
    Ok(())
}

/// Users holding the protected role are never deleted.
pub fn ensure_user_deletable(holds_super_admin: bool) -> Result<(), AppError> {
    if holds_super_admin {
        tracing::warn!("rejected deletion of super admin user");
        return Err(AppError::protected(anyhow!("Cannot delete a super admin user")));
    }
    Ok(())
}

/// Removing a member must not leave the protected role without members.
pub fn ensure_member_removable(
    role_name: &str,
    role_is_protected_flag: bool,
    is_member: bool,
    member_count: usize,
) -> Result<(), AppError> {
    if !is_member {
        return Err(AppError::not_found(anyhow!(
            "User does not have the '{}' role",
            role_name
        )));
    }
    if role_is_protected(role_name, role_is_protected_flag) && member_count <= 1 {
        tracing::warn!(role = %role_name, "rejected removal of last protected role member");
        return Err(AppError::protected(anyhow!(
            "Cannot remove the last member of the '{}' role",
            role_name
        )));
    }
    Ok(())
}

/// Replacing a user's role set is a removal from every role not kept.
///
/// `super_admin_member_count` is the current member count of the protected
/// role; it only matters when the user holds the role and would lose it.
pub fn ensure_roles_replaceable(
    holds_super_admin: bool,
    keeps_super_admin: bool,
    super_admin_member_count: usize,
) -> Result<(), AppError> {
    if holds_super_admin && !keeps_super_admin && super_admin_member_count <= 1 {
        tracing::warn!("rejected role change that would leave super-admin without members");
        return Err(AppError::protected(anyhow!(
            "Cannot remove the last member of the 'super-admin' role"
        )));
    }
    Ok(())
}

/// Handing out the protected role, or editing a user who holds it, takes the
/// same `manage roles` grant as changing its membership directly.
pub fn ensure_role_assignable(
    actor_can_manage_roles: bool,
    grants_protected_role: bool,
    target_holds_super_admin: bool,
) -> Result<(), AppError> {
    if actor_can_manage_roles || !(grants_protected_role || target_holds_super_admin) {
        return Ok(());
    }
    tracing::warn!(
        grants_protected_role,
        target_holds_super_admin,
        "rejected super admin assignment without 'manage roles'"
    );
    if grants_protected_role {
        return Err(AppError::forbidden(anyhow!(
            "Access denied. Assigning the 'super-admin' role requires 'manage roles'"
        )));
    }
    Err(AppError::forbidden(anyhow!(
        "Access denied. Editing a super admin requires 'manage roles'"
    )))
}
