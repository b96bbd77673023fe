//! Bootstrap and demo seeding.
//!
//! Everything here goes through [`RbacStore`], so the same code seeds the
//! Postgres and the in-memory backends and is subject to the same invariants.

use std::collections::HashMap;
use std::time::Instant;

use fake::Fake;
use fake::faker::name::en::{FirstName, LastName};
use warden_core::{
    AppError, ErrorKind, hash_password,
    permissions::{
        ADMIN_PERMISSIONS, ADMIN_ROLE, DEFAULT_GUARD, DEFAULT_PERMISSIONS, SUPER_ADMIN_ROLE,
    },
    validate_dto,
};
use warden_db::RbacStore;
use warden_models::{CreateUserDto, NewUser, PermissionId, Role, UserWithRoles};

/// The initial super admin account.
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    pub name: String,
    pub email: String,
    pub password: String,
    pub bcrypt_cost: u32,
}

impl BootstrapConfig {
    /// `WARDEN_ADMIN_NAME`, `WARDEN_ADMIN_EMAIL` and `WARDEN_ADMIN_PASSWORD`,
    /// defaulting to `Super Admin <admin@example.com>` / `password`.
    pub fn from_env() -> Self {
        let password = std::env::var("WARDEN_ADMIN_PASSWORD").unwrap_or_else(|_| {
            tracing::warn!("WARDEN_ADMIN_PASSWORD not set, using the default password");
            "password".to_string()
        });
        Self {
            name: std::env::var("WARDEN_ADMIN_NAME").unwrap_or_else(|_| "Super Admin".to_string()),
            email: std::env::var("WARDEN_ADMIN_EMAIL")
                .unwrap_or_else(|_| "admin@example.com".to_string()),
            password,
            bcrypt_cost: warden_config::PasswordConfig::from_env().bcrypt_cost,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BootstrapReport {
    pub permissions_created: usize,
    pub roles_created: usize,
    pub super_admin_created: bool,
}

/// Creates the default permissions, the `super-admin` and `admin` roles and
/// the first super admin user.
///
/// Safe to re-run: records that already exist are left as they are, and an
/// existing admin account is only (re)attached to `super-admin`.
pub async fn bootstrap(
    store: &dyn RbacStore,
    config: &BootstrapConfig,
) -> Result<BootstrapReport, AppError> {
    let start = Instant::now();
    let mut report = BootstrapReport::default();

    validate_dto(&CreateUserDto {
        name: config.name.clone(),
        email: config.email.clone(),
        password: config.password.clone(),
        role: SUPER_ADMIN_ROLE.to_string(),
    })?;

    for name in DEFAULT_PERMISSIONS {
        match store.create_permission(name, DEFAULT_GUARD).await {
            Ok(_) => report.permissions_created += 1,
            Err(e) if e.kind() == ErrorKind::DuplicateName => {}
            Err(e) => return Err(e),
        }
    }

    let ids_by_name: HashMap<String, PermissionId> = store
        .list_permissions()
        .await?
        .into_iter()
        .map(|p| (p.permission.name, p.permission.id))
        .collect();

    let all_ids: Vec<PermissionId> = ids_by_name.values().copied().collect();
    let super_admin = ensure_role(
        store,
        SUPER_ADMIN_ROLE,
        "Full access to all features",
        &all_ids,
        &mut report,
    )
    .await?;

    let admin_ids: Vec<PermissionId> = ADMIN_PERMISSIONS
        .iter()
        .filter_map(|name| ids_by_name.get(*name).copied())
        .collect();
    ensure_role(
        store,
        ADMIN_ROLE,
        "Administrative access with some restrictions",
        &admin_ids,
        &mut report,
    )
    .await?;

    match store.find_user_by_email(&config.email).await? {
        Some(user) => match store.add_member(super_admin.id, user.id).await {
            Ok(()) => tracing::info!(email = %config.email, "attached existing user to super-admin"),
            Err(e) if e.kind() == ErrorKind::AlreadyMember => {}
            Err(e) => return Err(e),
        },
        None => {
            let password_hash = hash_password(&config.password, config.bcrypt_cost)?;
            store
                .create_user(NewUser {
                    name: config.name.clone(),
                    email: config.email.clone(),
                    password_hash,
                    role_name: SUPER_ADMIN_ROLE.to_string(),
                })
                .await?;
            report.super_admin_created = true;
        }
    }

    tracing::info!(
        permissions_created = report.permissions_created,
        roles_created = report.roles_created,
        super_admin_created = report.super_admin_created,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "bootstrap complete"
    );
    Ok(report)
}

async fn ensure_role(
    store: &dyn RbacStore,
    name: &str,
    description: &str,
    permission_ids: &[PermissionId],
    report: &mut BootstrapReport,
) -> Result<Role, AppError> {
    if let Some(role) = store.find_role_by_name(name).await? {
        return Ok(role);
    }
    let created = store
        .create_role(name, Some(description), permission_ids)
        .await?;
    report.roles_created += 1;
    Ok(created.role)
}

/// Creates `count` fake users holding the `admin` role, all sharing
/// `password`.
pub async fn seed_users(
    store: &dyn RbacStore,
    count: usize,
    password: &str,
    bcrypt_cost: u32,
) -> Result<Vec<UserWithRoles>, AppError> {
    let start = Instant::now();
    // One hash for the whole batch.
    let password_hash = hash_password(password, bcrypt_cost)?;
    let batch = batch_suffix();

    let mut users = Vec::with_capacity(count);
    for idx in 0..count {
        let first_name: String = FirstName().fake();
        let last_name: String = LastName().fake();
        let email = format!(
            "{}.{}+{}{}@example.com",
            slug(&first_name),
            slug(&last_name),
            batch,
            idx
        );

        let user = store
            .create_user(NewUser {
                name: format!("{} {}", first_name, last_name),
                email,
                password_hash: password_hash.clone(),
                role_name: ADMIN_ROLE.to_string(),
            })
            .await?;
        users.push(user);
    }

    tracing::info!(
        count,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "seeded users"
    );
    Ok(users)
}

fn slug(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

// Keeps emails unique across repeated seeding runs.
fn batch_suffix() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or_default();
    format!("{:08x}", nanos)
}
