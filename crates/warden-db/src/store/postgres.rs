//! Postgres RBAC store.
//!
//! Each mutation runs in one transaction. Rows an invariant depends on are
//! locked before they are read (`FOR UPDATE`, or `FOR SHARE` for rows that
//! only need to keep existing). Locks are always taken roles first, then
//! users; the `super-admin` row is locked before its members are counted.
//!
//! Uniqueness is left to the table constraints and unique violations are
//! mapped to `DuplicateName` at the statement that caused them.

use std::collections::HashMap;

use anyhow::anyhow;
use async_trait::async_trait;
use sqlx::{FromRow, PgConnection, PgPool};
use warden_core::{
    AppError, SUPER_ADMIN_ROLE, policy,
    permissions::{is_protected_permission_name, is_protected_role_name},
};
use warden_models::{
    NewUser, Permission, PermissionId, PermissionWithRoles, Role, RoleId, RoleRef,
    RoleWithRelations, User, UserChanges, UserId, UserSummary, UserWithRoles,
};

use super::{RbacStore, StoreResult, dedup_ids};

const PERMISSION_COLUMNS: &str = "id, name, guard_name, is_protected, created_at, updated_at";
const ROLE_COLUMNS: &str = "id, name, description, is_protected, created_at, updated_at";
const USER_COLUMNS: &str = "id, name, email, password_hash, created_at, updated_at";

#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

/// Maps a unique violation to `DuplicateName`, anything else to `Internal`.
fn unique_or_internal(err: sqlx::Error, message: String) -> AppError {
    if is_unique_violation(&err) {
        AppError::duplicate_name(anyhow!(message))
    } else {
        AppError::database(err)
    }
}

#[derive(FromRow)]
struct PermissionRoleRow {
    permission_id: PermissionId,
    role_id: RoleId,
    role_name: String,
}

#[derive(FromRow)]
struct RolePermissionRow {
    role_id: RoleId,
    #[sqlx(flatten)]
    permission: Permission,
}

#[derive(FromRow)]
struct RoleUserRow {
    role_id: RoleId,
    #[sqlx(flatten)]
    user: UserSummary,
}

#[derive(FromRow)]
struct UserRoleRow {
    user_id: UserId,
    #[sqlx(flatten)]
    role: RoleRef,
}

async fn lock_permission(conn: &mut PgConnection, id: PermissionId) -> StoreResult<Permission> {
    sqlx::query_as::<_, Permission>(&format!(
        "SELECT {PERMISSION_COLUMNS} FROM permissions WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::not_found(anyhow!("Permission not found")))
}

async fn lock_role(conn: &mut PgConnection, id: RoleId) -> StoreResult<Role> {
    sqlx::query_as::<_, Role>(&format!(
        "SELECT {ROLE_COLUMNS} FROM roles WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::not_found(anyhow!("Role not found")))
}

async fn lock_super_admin(conn: &mut PgConnection) -> StoreResult<Option<Role>> {
    let role = sqlx::query_as::<_, Role>(&format!(
        "SELECT {ROLE_COLUMNS} FROM roles WHERE name = $1 FOR UPDATE"
    ))
    .bind(SUPER_ADMIN_ROLE)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(role)
}

async fn share_role_by_name(conn: &mut PgConnection, name: &str) -> StoreResult<Role> {
    sqlx::query_as::<_, Role>(&format!(
        "SELECT {ROLE_COLUMNS} FROM roles WHERE name = $1 FOR SHARE"
    ))
    .bind(name)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::not_found(anyhow!("Role '{}' not found", name)))
}

async fn lock_user(conn: &mut PgConnection, id: UserId, clause: &str) -> StoreResult<User> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = $1 {clause}"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::not_found(anyhow!("User not found")))
}

async fn is_member(conn: &mut PgConnection, role_id: RoleId, user_id: UserId) -> StoreResult<bool> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM user_roles WHERE role_id = $1 AND user_id = $2)",
    )
    .bind(role_id)
    .bind(user_id)
    .fetch_one(&mut *conn)
    .await?;
    Ok(exists)
}

async fn member_count(conn: &mut PgConnection, role_id: RoleId) -> StoreResult<usize> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_roles WHERE role_id = $1")
        .bind(role_id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(count.max(0) as usize)
}

/// Checks every id exists and holds a share lock on them until commit.
async fn share_permissions(
    conn: &mut PgConnection,
    ids: &[PermissionId],
) -> StoreResult<Vec<PermissionId>> {
    let ids = dedup_ids(ids);
    if ids.is_empty() {
        return Ok(ids);
    }

    let found: Vec<PermissionId> =
        sqlx::query_scalar("SELECT id FROM permissions WHERE id = ANY($1) FOR SHARE")
            .bind(&ids)
            .fetch_all(&mut *conn)
            .await?;
    if let Some(missing) = ids.iter().find(|id| !found.contains(id)) {
        return Err(AppError::not_found(anyhow!(
            "Permission {} not found",
            missing
        )));
    }
    Ok(ids)
}

async fn grant_permissions(
    conn: &mut PgConnection,
    role_id: RoleId,
    permission_ids: &[PermissionId],
) -> StoreResult<()> {
    if permission_ids.is_empty() {
        return Ok(());
    }
    sqlx::query(
        "INSERT INTO role_permissions (role_id, permission_id) SELECT $1, UNNEST($2::uuid[])",
    )
    .bind(role_id)
    .bind(permission_ids)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn fetch_permission_roles(
    conn: &mut PgConnection,
    permission_id: Option<PermissionId>,
) -> StoreResult<HashMap<PermissionId, Vec<RoleRef>>> {
    let rows = sqlx::query_as::<_, PermissionRoleRow>(
        r#"SELECT rp.permission_id, r.id AS role_id, r.name AS role_name
           FROM role_permissions rp
           JOIN roles r ON r.id = rp.role_id
           WHERE $1::uuid IS NULL OR rp.permission_id = $1
           ORDER BY r.name"#,
    )
    .bind(permission_id)
    .fetch_all(&mut *conn)
    .await?;

    let mut grouped: HashMap<PermissionId, Vec<RoleRef>> = HashMap::new();
    for row in rows {
        grouped.entry(row.permission_id).or_default().push(RoleRef {
            id: row.role_id,
            name: row.role_name,
        });
    }
    Ok(grouped)
}

async fn fetch_role_relations(
    conn: &mut PgConnection,
    roles: Vec<Role>,
) -> StoreResult<Vec<RoleWithRelations>> {
    let ids: Vec<RoleId> = roles.iter().map(|r| r.id).collect();

    let permission_rows = sqlx::query_as::<_, RolePermissionRow>(
        r#"SELECT rp.role_id, p.id, p.name, p.guard_name, p.is_protected, p.created_at, p.updated_at
           FROM role_permissions rp
           JOIN permissions p ON p.id = rp.permission_id
           WHERE rp.role_id = ANY($1)
           ORDER BY p.name"#,
    )
    .bind(&ids)
    .fetch_all(&mut *conn)
    .await?;

    let user_rows = sqlx::query_as::<_, RoleUserRow>(
        r#"SELECT ur.role_id, u.id, u.name, u.email
           FROM user_roles ur
           JOIN users u ON u.id = ur.user_id
           WHERE ur.role_id = ANY($1)
           ORDER BY u.name, u.email"#,
    )
    .bind(&ids)
    .fetch_all(&mut *conn)
    .await?;

    let mut permissions: HashMap<RoleId, Vec<Permission>> = HashMap::new();
    for row in permission_rows {
        permissions.entry(row.role_id).or_default().push(row.permission);
    }
    let mut users: HashMap<RoleId, Vec<UserSummary>> = HashMap::new();
    for row in user_rows {
        users.entry(row.role_id).or_default().push(row.user);
    }

    Ok(roles
        .into_iter()
        .map(|role| RoleWithRelations {
            permissions: permissions.remove(&role.id).unwrap_or_default(),
            users: users.remove(&role.id).unwrap_or_default(),
            role,
        })
        .collect())
}

async fn fetch_role(conn: &mut PgConnection, id: RoleId) -> StoreResult<RoleWithRelations> {
    let role = sqlx::query_as::<_, Role>(&format!("SELECT {ROLE_COLUMNS} FROM roles WHERE id = $1"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Role not found")))?;

    fetch_role_relations(conn, vec![role])
        .await?
        .pop()
        .ok_or_else(|| AppError::internal(anyhow!("Role relations missing")))
}

async fn fetch_user_roles(
    conn: &mut PgConnection,
    user_ids: &[UserId],
) -> StoreResult<HashMap<UserId, Vec<RoleRef>>> {
    let rows = sqlx::query_as::<_, UserRoleRow>(
        r#"SELECT ur.user_id, r.id, r.name
           FROM user_roles ur
           JOIN roles r ON r.id = ur.role_id
           WHERE ur.user_id = ANY($1)
           ORDER BY r.name"#,
    )
    .bind(user_ids)
    .fetch_all(&mut *conn)
    .await?;

    let mut grouped: HashMap<UserId, Vec<RoleRef>> = HashMap::new();
    for row in rows {
        grouped.entry(row.user_id).or_default().push(row.role);
    }
    Ok(grouped)
}

async fn fetch_user(conn: &mut PgConnection, id: UserId) -> StoreResult<UserWithRoles> {
    let user = lock_user(conn, id, "").await?;
    let mut roles = fetch_user_roles(conn, &[id]).await?;
    Ok(UserWithRoles::new(user, roles.remove(&id).unwrap_or_default()))
}

async fn ensure_role_exists(conn: &mut PgConnection, id: RoleId) -> StoreResult<()> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM roles WHERE id = $1)")
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;
    if !exists {
        return Err(AppError::not_found(anyhow!("Role not found")));
    }
    Ok(())
}

#[async_trait]
impl RbacStore for PostgresStore {
    async fn create_permission(&self, name: &str, guard_name: &str) -> StoreResult<Permission> {
        sqlx::query_as::<_, Permission>(&format!(
            "INSERT INTO permissions (id, name, guard_name, is_protected) VALUES ($1, $2, $3, $4) RETURNING {PERMISSION_COLUMNS}"
        ))
        .bind(PermissionId::new())
        .bind(name)
        .bind(guard_name)
        .bind(is_protected_permission_name(name))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| unique_or_internal(e, format!("Permission '{}' already exists", name)))
    }

    async fn rename_permission(
        &self,
        id: PermissionId,
        new_name: &str,
    ) -> StoreResult<Permission> {
        let mut tx = self.pool.begin().await?;
        let current = lock_permission(&mut tx, id).await?;
        if current.name == new_name {
            tx.commit().await?;
            return Ok(current);
        }

        let renamed = sqlx::query_as::<_, Permission>(&format!(
            "UPDATE permissions SET name = $2, updated_at = NOW() WHERE id = $1 RETURNING {PERMISSION_COLUMNS}"
        ))
        .bind(id)
        .bind(new_name)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| unique_or_internal(e, format!("Permission '{}' already exists", new_name)))?;

        tx.commit().await?;
        Ok(renamed)
    }

    async fn delete_permission(&self, id: PermissionId) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        let permission = lock_permission(&mut tx, id).await?;
        policy::ensure_permission_deletable(&permission.name, permission.is_protected)?;

        sqlx::query("DELETE FROM role_permissions WHERE permission_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM permissions WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn get_permission(&self, id: PermissionId) -> StoreResult<PermissionWithRoles> {
        let mut conn = self.pool.acquire().await?;
        let permission = sqlx::query_as::<_, Permission>(&format!(
            "SELECT {PERMISSION_COLUMNS} FROM permissions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Permission not found")))?;

        let mut roles = fetch_permission_roles(&mut conn, Some(id)).await?;
        Ok(PermissionWithRoles {
            roles: roles.remove(&id).unwrap_or_default(),
            permission,
        })
    }

    async fn list_permissions(&self) -> StoreResult<Vec<PermissionWithRoles>> {
        let mut conn = self.pool.acquire().await?;
        let permissions = sqlx::query_as::<_, Permission>(&format!(
            "SELECT {PERMISSION_COLUMNS} FROM permissions ORDER BY name"
        ))
        .fetch_all(&mut *conn)
        .await?;

        let mut roles = fetch_permission_roles(&mut conn, None).await?;
        Ok(permissions
            .into_iter()
            .map(|permission| PermissionWithRoles {
                roles: roles.remove(&permission.id).unwrap_or_default(),
                permission,
            })
            .collect())
    }

    async fn create_role(
        &self,
        name: &str,
        description: Option<&str>,
        permission_ids: &[PermissionId],
    ) -> StoreResult<RoleWithRelations> {
        let mut tx = self.pool.begin().await?;
        let permission_ids = share_permissions(&mut tx, permission_ids).await?;

        let role_id = RoleId::new();
        sqlx::query(
            "INSERT INTO roles (id, name, description, is_protected) VALUES ($1, $2, $3, $4)",
        )
        .bind(role_id)
        .bind(name)
        .bind(description)
        .bind(is_protected_role_name(name))
        .execute(&mut *tx)
        .await
        .map_err(|e| unique_or_internal(e, format!("Role '{}' already exists", name)))?;

        grant_permissions(&mut tx, role_id, &permission_ids).await?;

        let role = fetch_role(&mut tx, role_id).await?;
        tx.commit().await?;
        Ok(role)
    }

    async fn update_role(
        &self,
        id: RoleId,
        name: &str,
        description: Option<&str>,
        permission_ids: &[PermissionId],
    ) -> StoreResult<RoleWithRelations> {
        let mut tx = self.pool.begin().await?;
        let current = lock_role(&mut tx, id).await?;
        policy::ensure_role_renamable(&current.name, current.is_protected, name)?;
        let permission_ids = share_permissions(&mut tx, permission_ids).await?;

        sqlx::query(
            "UPDATE roles SET name = $2, description = $3, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .execute(&mut *tx)
        .await
        .map_err(|e| unique_or_internal(e, format!("Role '{}' already exists", name)))?;

        sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        grant_permissions(&mut tx, id, &permission_ids).await?;

        let role = fetch_role(&mut tx, id).await?;
        tx.commit().await?;
        Ok(role)
    }

    async fn delete_role(&self, id: RoleId) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        let role = lock_role(&mut tx, id).await?;
        policy::ensure_role_deletable(&role.name, role.is_protected)?;

        sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM user_roles WHERE role_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn get_role(&self, id: RoleId) -> StoreResult<RoleWithRelations> {
        let mut conn = self.pool.acquire().await?;
        fetch_role(&mut conn, id).await
    }

    async fn find_role_by_name(&self, name: &str) -> StoreResult<Option<Role>> {
        let role = sqlx::query_as::<_, Role>(&format!(
            "SELECT {ROLE_COLUMNS} FROM roles WHERE name = $1"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(role)
    }

    async fn list_roles(&self) -> StoreResult<Vec<RoleWithRelations>> {
        let mut conn = self.pool.acquire().await?;
        let roles = sqlx::query_as::<_, Role>(&format!(
            "SELECT {ROLE_COLUMNS} FROM roles ORDER BY name"
        ))
        .fetch_all(&mut *conn)
        .await?;
        fetch_role_relations(&mut conn, roles).await
    }

    async fn add_member(&self, role_id: RoleId, user_id: UserId) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        let role = lock_role(&mut tx, role_id).await?;
        lock_user(&mut tx, user_id, "FOR SHARE").await?;

        let inserted = sqlx::query(
            "INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(role_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        if inserted == 0 {
            return Err(AppError::already_member(anyhow!(
                "User already has the '{}' role",
                role.name
            )));
        }

        tx.commit().await?;
        Ok(())
    }

    async fn remove_member(&self, role_id: RoleId, user_id: UserId) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        let role = lock_role(&mut tx, role_id).await?;
        let member = is_member(&mut tx, role_id, user_id).await?;
        let count = member_count(&mut tx, role_id).await?;
        policy::ensure_member_removable(&role.name, role.is_protected, member, count)?;

        sqlx::query("DELETE FROM user_roles WHERE role_id = $1 AND user_id = $2")
            .bind(role_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn list_role_members(&self, role_id: RoleId) -> StoreResult<Vec<UserSummary>> {
        let mut conn = self.pool.acquire().await?;
        ensure_role_exists(&mut conn, role_id).await?;
        let users = sqlx::query_as::<_, UserSummary>(
            r#"SELECT u.id, u.name, u.email
               FROM users u
               JOIN user_roles ur ON ur.user_id = u.id
               WHERE ur.role_id = $1
               ORDER BY u.name, u.email"#,
        )
        .bind(role_id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(users)
    }

    async fn list_available_users(&self, role_id: RoleId) -> StoreResult<Vec<UserSummary>> {
        let mut conn = self.pool.acquire().await?;
        ensure_role_exists(&mut conn, role_id).await?;
        let users = sqlx::query_as::<_, UserSummary>(
            r#"SELECT u.id, u.name, u.email
               FROM users u
               WHERE NOT EXISTS (
                   SELECT 1 FROM user_roles ur WHERE ur.user_id = u.id AND ur.role_id = $1
               )
               ORDER BY u.name, u.email"#,
        )
        .bind(role_id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(users)
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<UserWithRoles> {
        let mut tx = self.pool.begin().await?;
        let role = share_role_by_name(&mut tx, &user.role_name).await?;

        let user_id = UserId::new();
        sqlx::query("INSERT INTO users (id, name, email, password_hash) VALUES ($1, $2, $3, $4)")
            .bind(user_id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                unique_or_internal(
                    e,
                    format!("The email '{}' has already been taken", user.email),
                )
            })?;

        sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2)")
            .bind(user_id)
            .bind(role.id)
            .execute(&mut *tx)
            .await?;

        let created = fetch_user(&mut tx, user_id).await?;
        tx.commit().await?;
        Ok(created)
    }

    async fn update_user(&self, id: UserId, changes: UserChanges) -> StoreResult<UserWithRoles> {
        let mut tx = self.pool.begin().await?;
        let super_admin = lock_super_admin(&mut tx).await?;
        let role = share_role_by_name(&mut tx, &changes.role_name).await?;
        lock_user(&mut tx, id, "FOR UPDATE").await?;

        if let Some(super_admin) = &super_admin {
            let holds = is_member(&mut tx, super_admin.id, id).await?;
            let count = member_count(&mut tx, super_admin.id).await?;
            policy::ensure_roles_replaceable(holds, super_admin.id == role.id, count)?;
        }

        sqlx::query(
            r#"UPDATE users
               SET name = $2, email = $3, password_hash = COALESCE($4, password_hash), updated_at = NOW()
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.email)
        .bind(changes.password_hash.as_deref())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            unique_or_internal(
                e,
                format!("The email '{}' has already been taken", changes.email),
            )
        })?;

        sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2)")
            .bind(id)
            .bind(role.id)
            .execute(&mut *tx)
            .await?;

        let updated = fetch_user(&mut tx, id).await?;
        tx.commit().await?;
        Ok(updated)
    }

    async fn delete_user(&self, id: UserId) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        let super_admin = lock_super_admin(&mut tx).await?;
        lock_user(&mut tx, id, "FOR UPDATE").await?;

        let holds = match &super_admin {
            Some(role) => is_member(&mut tx, role.id, id).await?,
            None => false,
        };
        policy::ensure_user_deletable(holds)?;

        sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn get_user(&self, id: UserId) -> StoreResult<UserWithRoles> {
        let mut conn = self.pool.acquire().await?;
        fetch_user(&mut conn, id).await
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn list_users(&self) -> StoreResult<Vec<UserWithRoles>> {
        let mut conn = self.pool.acquire().await?;
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC"
        ))
        .fetch_all(&mut *conn)
        .await?;

        let ids: Vec<UserId> = users.iter().map(|u| u.id).collect();
        let mut roles = fetch_user_roles(&mut conn, &ids).await?;
        Ok(users
            .into_iter()
            .map(|user| {
                let user_roles = roles.remove(&user.id).unwrap_or_default();
                UserWithRoles::new(user, user_roles)
            })
            .collect())
    }

    async fn user_roles(&self, id: UserId) -> StoreResult<Vec<RoleRef>> {
        Ok(self.get_user(id).await?.roles)
    }

    async fn effective_permissions(&self, id: UserId) -> StoreResult<Vec<String>> {
        let mut conn = self.pool.acquire().await?;
        lock_user(&mut conn, id, "").await?;
        let names: Vec<String> = sqlx::query_scalar(
            r#"SELECT DISTINCT p.name
               FROM user_roles ur
               JOIN role_permissions rp ON rp.role_id = ur.role_id
               JOIN permissions p ON p.id = rp.permission_id
               WHERE ur.user_id = $1
               ORDER BY p.name"#,
        )
        .bind(id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(names)
    }

    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
