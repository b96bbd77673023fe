use anyhow::anyhow;
use tracing::instrument;
use warden_core::permissions::MANAGE_ROLES;
use warden_core::{AppError, hash_password, policy, validate_dto, verify_password};
use warden_db::RbacStore;
use warden_models::{
    CreateUserDto, NewUser, UpdateUserDto, User, UserChanges, UserId, UserWithRoles,
};

use crate::modules::{authorization, observe};

const ENTITY: &str = "user";

/// Creates a user holding exactly the role named in `dto.role`.
///
/// Only an `actor` with `manage roles` may create a super admin.
#[instrument(skip(store, dto), fields(email = %dto.email, role = %dto.role))]
pub async fn create_user(
    store: &dyn RbacStore,
    actor: UserId,
    dto: CreateUserDto,
    bcrypt_cost: u32,
) -> Result<UserWithRoles, AppError> {
    validate_dto(&dto)?;
    ensure_can_assign(store, actor, dto.role.trim(), None).await?;

    let password_hash = hash_password(&dto.password, bcrypt_cost)?;
    let user = observe(
        ENTITY,
        "create",
        store
            .create_user(NewUser {
                name: dto.name.trim().to_string(),
                email: dto.email.trim().to_string(),
                password_hash,
                role_name: dto.role.trim().to_string(),
            })
            .await,
    )?;

    tracing::info!(user_id = %user.id, email = %user.email, "user created");
    Ok(user)
}

/// Replaces the user's details and role set. An absent or empty password
/// keeps the stored hash.
///
/// Promoting someone to super admin, or editing an existing one, needs an
/// `actor` with `manage roles`.
#[instrument(skip(store, dto), fields(email = %dto.email, role = %dto.role))]
pub async fn update_user(
    store: &dyn RbacStore,
    actor: UserId,
    id: UserId,
    dto: UpdateUserDto,
    bcrypt_cost: u32,
) -> Result<UserWithRoles, AppError> {
    validate_dto(&dto)?;
    ensure_can_assign(store, actor, dto.role.trim(), Some(id)).await?;

    let password_hash = dto
        .new_password()
        .map(|password| hash_password(password, bcrypt_cost))
        .transpose()?;

    let user = observe(
        ENTITY,
        "update",
        store
            .update_user(
                id,
                UserChanges {
                    name: dto.name.trim().to_string(),
                    email: dto.email.trim().to_string(),
                    password_hash,
                    role_name: dto.role.trim().to_string(),
                },
            )
            .await,
    )?;

    tracing::info!(user_id = %user.id, "user updated");
    Ok(user)
}

#[instrument(skip(store))]
pub async fn delete_user(store: &dyn RbacStore, id: UserId) -> Result<(), AppError> {
    observe(ENTITY, "delete", store.delete_user(id).await)?;
    tracing::info!(user_id = %id, "user deleted");
    Ok(())
}

#[instrument(skip(store))]
pub async fn get_user(store: &dyn RbacStore, id: UserId) -> Result<UserWithRoles, AppError> {
    store.get_user(id).await
}

/// Newest first.
#[instrument(skip(store))]
pub async fn list_users(store: &dyn RbacStore) -> Result<Vec<UserWithRoles>, AppError> {
    store.list_users().await
}

/// Checks an email/password pair. Unknown emails and wrong passwords give
/// the same `Unauthorized` error.
#[instrument(skip(store, password))]
pub async fn authenticate(
    store: &dyn RbacStore,
    email: &str,
    password: &str,
) -> Result<User, AppError> {
    let user = store
        .find_user_by_email(email.trim())
        .await?
        .ok_or_else(|| AppError::unauthorized(anyhow!("Invalid email or password")))?;

    if !verify_password(password, &user.password_hash)? {
        return Err(AppError::unauthorized(anyhow!("Invalid email or password")));
    }

    Ok(user)
}

async fn ensure_can_assign(
    store: &dyn RbacStore,
    actor: UserId,
    role_name: &str,
    target: Option<UserId>,
) -> Result<(), AppError> {
    let grants_protected_role = store
        .find_role_by_name(role_name)
        .await?
        .is_some_and(|role| policy::role_is_protected(&role.name, role.is_protected));
    let target_holds_super_admin = match target {
        Some(id) => authorization::service::is_super_admin(store, id).await?,
        None => false,
    };
    if !grants_protected_role && !target_holds_super_admin {
        return Ok(());
    }

    let actor_can_manage_roles =
        authorization::service::has_permission(store, actor, MANAGE_ROLES).await?;
    policy::ensure_role_assignable(
        actor_can_manage_roles,
        grants_protected_role,
        target_holds_super_admin,
    )
}
