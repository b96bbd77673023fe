use anyhow::anyhow;
use tracing::instrument;
use warden_core::{AppError, ErrorKind, permissions::is_protected_role_name};
use warden_db::RbacStore;
use warden_models::{UserId, UserPermissions};

/// Distinct permission names across the user's roles, sorted by name.
#[instrument(skip(store))]
pub async fn effective_permissions(
    store: &dyn RbacStore,
    user_id: UserId,
) -> Result<UserPermissions, AppError> {
    let is_super_admin = is_super_admin(store, user_id).await?;
    let permissions = store.effective_permissions(user_id).await?;

    Ok(UserPermissions {
        user_id,
        is_super_admin,
        permissions,
    })
}

#[instrument(skip(store))]
pub async fn has_permission(
    store: &dyn RbacStore,
    user_id: UserId,
    permission: &str,
) -> Result<bool, AppError> {
    let permissions = store.effective_permissions(user_id).await?;
    Ok(permissions.iter().any(|p| p == permission))
}

#[instrument(skip(store))]
pub async fn is_super_admin(store: &dyn RbacStore, user_id: UserId) -> Result<bool, AppError> {
    let roles = store.user_roles(user_id).await?;
    Ok(roles.iter().any(|role| is_protected_role_name(&role.name)))
}

/// Admits `user_id` only if one of their roles grants `permission`.
///
/// A token whose user no longer exists is `Unauthorized`; a missing grant is
/// `Forbidden`.
pub async fn ensure_permission(
    store: &dyn RbacStore,
    user_id: UserId,
    permission: &str,
) -> Result<(), AppError> {
    let allowed = match has_permission(store, user_id, permission).await {
        Ok(allowed) => allowed,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(AppError::unauthorized(anyhow!("User no longer exists")));
        }
        Err(e) => return Err(e),
    };

    if !allowed {
        tracing::warn!(user_id = %user_id, permission, "permission denied");
        return Err(AppError::forbidden(anyhow!(
            "Access denied. Missing required permission: {}",
            permission
        )));
    }

    Ok(())
}
