use tracing::instrument;
use warden_core::{AppError, validate_dto};
use warden_db::RbacStore;
use warden_models::{
    CreateRoleDto, RoleId, RoleMembers, RoleWithRelations, UpdateRoleDto, UserId, UserSummary,
};

use crate::modules::observe;

const ENTITY: &str = "role";
const MEMBERSHIP: &str = "membership";

fn description(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|d| !d.is_empty())
}

#[instrument(skip(store))]
pub async fn create_role(
    store: &dyn RbacStore,
    dto: CreateRoleDto,
) -> Result<RoleWithRelations, AppError> {
    validate_dto(&dto)?;

    let role = observe(
        ENTITY,
        "create",
        store
            .create_role(
                dto.name.trim(),
                description(dto.description.as_deref()),
                &dto.permission_ids,
            )
            .await,
    )?;

    tracing::info!(
        role_id = %role.role.id,
        name = %role.role.name,
        permissions = role.permissions.len(),
        "role created"
    );
    Ok(role)
}

/// Replaces name, description and the whole permission set.
#[instrument(skip(store))]
pub async fn update_role(
    store: &dyn RbacStore,
    id: RoleId,
    dto: UpdateRoleDto,
) -> Result<RoleWithRelations, AppError> {
    validate_dto(&dto)?;

    let role = observe(
        ENTITY,
        "update",
        store
            .update_role(
                id,
                dto.name.trim(),
                description(dto.description.as_deref()),
                &dto.permission_ids,
            )
            .await,
    )?;

    tracing::info!(
        role_id = %role.role.id,
        name = %role.role.name,
        permissions = role.permissions.len(),
        "role updated"
    );
    Ok(role)
}

#[instrument(skip(store))]
pub async fn delete_role(store: &dyn RbacStore, id: RoleId) -> Result<(), AppError> {
    observe(ENTITY, "delete", store.delete_role(id).await)?;
    tracing::info!(role_id = %id, "role deleted");
    Ok(())
}

#[instrument(skip(store))]
pub async fn get_role(store: &dyn RbacStore, id: RoleId) -> Result<RoleWithRelations, AppError> {
    store.get_role(id).await
}

#[instrument(skip(store))]
pub async fn list_roles(store: &dyn RbacStore) -> Result<Vec<RoleWithRelations>, AppError> {
    store.list_roles().await
}

// ============ Membership ============

#[instrument(skip(store))]
pub async fn add_member(
    store: &dyn RbacStore,
    role_id: RoleId,
    user_id: UserId,
) -> Result<(), AppError> {
    observe(MEMBERSHIP, "add", store.add_member(role_id, user_id).await)?;
    tracing::info!(role_id = %role_id, user_id = %user_id, "member added");
    Ok(())
}

#[instrument(skip(store))]
pub async fn remove_member(
    store: &dyn RbacStore,
    role_id: RoleId,
    user_id: UserId,
) -> Result<(), AppError> {
    observe(
        MEMBERSHIP,
        "remove",
        store.remove_member(role_id, user_id).await,
    )?;
    tracing::info!(role_id = %role_id, user_id = %user_id, "member removed");
    Ok(())
}

#[instrument(skip(store))]
pub async fn list_available_users(
    store: &dyn RbacStore,
    role_id: RoleId,
) -> Result<Vec<UserSummary>, AppError> {
    store.list_available_users(role_id).await
}

/// Members and candidate members of a role, for the membership screen.
#[instrument(skip(store))]
pub async fn role_members(store: &dyn RbacStore, role_id: RoleId) -> Result<RoleMembers, AppError> {
    let role = store.get_role(role_id).await?.role;
    let members = store.list_role_members(role_id).await?;
    let available_users = store.list_available_users(role_id).await?;

    Ok(RoleMembers {
        role,
        members,
        available_users,
    })
}
