use tracing::instrument;
use warden_core::{AppError, validate_dto};
use warden_db::RbacStore;
use warden_models::{
    CreatePermissionDto, Permission, PermissionId, PermissionWithRoles, RenamePermissionDto,
};

use crate::modules::observe;

const ENTITY: &str = "permission";

#[instrument(skip(store))]
pub async fn create_permission(
    store: &dyn RbacStore,
    dto: CreatePermissionDto,
    default_guard: &str,
) -> Result<Permission, AppError> {
    validate_dto(&dto)?;

    let guard_name = dto
        .guard_name
        .as_deref()
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .unwrap_or(default_guard);

    let permission = observe(
        ENTITY,
        "create",
        store.create_permission(dto.name.trim(), guard_name).await,
    )?;

    tracing::info!(
        permission_id = %permission.id,
        name = %permission.name,
        protected = permission.is_protected,
        "permission created"
    );
    Ok(permission)
}

/// Grants reference the id, so every role keeps the permission under its new
/// name.
#[instrument(skip(store))]
pub async fn rename_permission(
    store: &dyn RbacStore,
    id: PermissionId,
    dto: RenamePermissionDto,
) -> Result<Permission, AppError> {
    validate_dto(&dto)?;

    let permission = observe(
        ENTITY,
        "rename",
        store.rename_permission(id, dto.name.trim()).await,
    )?;

    tracing::info!(permission_id = %permission.id, name = %permission.name, "permission renamed");
    Ok(permission)
}

#[instrument(skip(store))]
pub async fn delete_permission(store: &dyn RbacStore, id: PermissionId) -> Result<(), AppError> {
    observe(ENTITY, "delete", store.delete_permission(id).await)?;
    tracing::info!(permission_id = %id, "permission deleted");
    Ok(())
}

#[instrument(skip(store))]
pub async fn get_permission(
    store: &dyn RbacStore,
    id: PermissionId,
) -> Result<PermissionWithRoles, AppError> {
    store.get_permission(id).await
}

#[instrument(skip(store))]
pub async fn list_permissions(store: &dyn RbacStore) -> Result<Vec<PermissionWithRoles>, AppError> {
    store.list_permissions().await
}
