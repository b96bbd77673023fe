//! In-memory RBAC store.
//!
//! All tables sit behind a single `tokio::sync::RwLock`. Mutations hold the
//! write lock across their checks and writes, which gives each call the same
//! all-or-nothing behaviour as a Postgres transaction. Nothing survives a
//! restart.

use std::collections::{BTreeSet, HashMap};

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use warden_core::{
    AppError, policy,
    permissions::{is_protected_permission_name, is_protected_role_name},
};
use warden_models::{
    NewUser, Permission, PermissionId, PermissionWithRoles, Role, RoleId, RoleRef,
    RoleWithRelations, User, UserChanges, UserId, UserSummary, UserWithRoles,
};

use super::{RbacStore, StoreResult, dedup_ids};

#[derive(Default)]
struct State {
    permissions: HashMap<PermissionId, Permission>,
    roles: HashMap<RoleId, Role>,
    users: HashMap<UserId, User>,
    role_permissions: BTreeSet<(RoleId, PermissionId)>,
    user_roles: BTreeSet<(UserId, RoleId)>,
}

impl State {
    fn permission(&self, id: PermissionId) -> StoreResult<&Permission> {
        self.permissions
            .get(&id)
            .ok_or_else(|| AppError::not_found(anyhow!("Permission not found")))
    }

    fn role(&self, id: RoleId) -> StoreResult<&Role> {
        self.roles
            .get(&id)
            .ok_or_else(|| AppError::not_found(anyhow!("Role not found")))
    }

    fn user(&self, id: UserId) -> StoreResult<&User> {
        self.users
            .get(&id)
            .ok_or_else(|| AppError::not_found(anyhow!("User not found")))
    }

    fn role_by_name(&self, name: &str) -> Option<&Role> {
        self.roles.values().find(|r| r.name == name)
    }

    fn super_admin_role(&self) -> Option<&Role> {
        self.roles.values().find(|r| is_protected_role_name(&r.name))
    }

    fn ensure_permission_name_free(
        &self,
        name: &str,
        except: Option<PermissionId>,
    ) -> StoreResult<()> {
        let taken = self
            .permissions
            .values()
            .any(|p| p.name == name && Some(p.id) != except);
        if taken {
            return Err(AppError::duplicate_name(anyhow!(
                "Permission '{}' already exists",
                name
            )));
        }
        Ok(())
    }

    fn ensure_role_name_free(&self, name: &str, except: Option<RoleId>) -> StoreResult<()> {
        let taken = self
            .roles
            .values()
            .any(|r| r.name == name && Some(r.id) != except);
        if taken {
            return Err(AppError::duplicate_name(anyhow!(
                "Role '{}' already exists",
                name
            )));
        }
        Ok(())
    }

    fn ensure_email_free(&self, email: &str, except: Option<UserId>) -> StoreResult<()> {
        let taken = self
            .users
            .values()
            .any(|u| u.email == email && Some(u.id) != except);
        if taken {
            return Err(AppError::duplicate_name(anyhow!(
                "The email '{}' has already been taken",
                email
            )));
        }
        Ok(())
    }

    fn ensure_permissions_exist(&self, ids: &[PermissionId]) -> StoreResult<Vec<PermissionId>> {
        let ids = dedup_ids(ids);
        if let Some(missing) = ids.iter().find(|id| !self.permissions.contains_key(id)) {
            return Err(AppError::not_found(anyhow!(
                "Permission {} not found",
                missing
            )));
        }
        Ok(ids)
    }

    fn member_count(&self, role_id: RoleId) -> usize {
        self.user_roles.iter().filter(|(_, r)| *r == role_id).count()
    }

    fn is_member(&self, role_id: RoleId, user_id: UserId) -> bool {
        self.user_roles.contains(&(user_id, role_id))
    }

    fn holds_super_admin(&self, user_id: UserId) -> bool {
        self.super_admin_role()
            .is_some_and(|role| self.is_member(role.id, user_id))
    }

    fn roles_granting(&self, permission_id: PermissionId) -> Vec<RoleRef> {
        let mut roles: Vec<RoleRef> = self
            .role_permissions
            .iter()
            .filter(|(_, p)| *p == permission_id)
            .filter_map(|(r, _)| self.roles.get(r).map(RoleRef::from))
            .collect();
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        roles
    }

    fn role_permissions(&self, role_id: RoleId) -> Vec<Permission> {
        let mut permissions: Vec<Permission> = self
            .role_permissions
            .iter()
            .filter(|(r, _)| *r == role_id)
            .filter_map(|(_, p)| self.permissions.get(p).cloned())
            .collect();
        permissions.sort_by(|a, b| a.name.cmp(&b.name));
        permissions
    }

    fn role_users(&self, role_id: RoleId) -> Vec<UserSummary> {
        let mut users: Vec<UserSummary> = self
            .user_roles
            .iter()
            .filter(|(_, r)| *r == role_id)
            .filter_map(|(u, _)| self.users.get(u).map(UserSummary::from))
            .collect();
        sort_summaries(&mut users);
        users
    }

    fn available_users(&self, role_id: RoleId) -> Vec<UserSummary> {
        let mut users: Vec<UserSummary> = self
            .users
            .values()
            .filter(|u| !self.is_member(role_id, u.id))
            .map(UserSummary::from)
            .collect();
        sort_summaries(&mut users);
        users
    }

    fn user_role_refs(&self, user_id: UserId) -> Vec<RoleRef> {
        let mut roles: Vec<RoleRef> = self
            .user_roles
            .iter()
            .filter(|(u, _)| *u == user_id)
            .filter_map(|(_, r)| self.roles.get(r).map(RoleRef::from))
            .collect();
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        roles
    }

    fn permission_with_roles(&self, permission: &Permission) -> PermissionWithRoles {
        PermissionWithRoles {
            permission: permission.clone(),
            roles: self.roles_granting(permission.id),
        }
    }

    fn role_with_relations(&self, role: &Role) -> RoleWithRelations {
        RoleWithRelations {
            role: role.clone(),
            permissions: self.role_permissions(role.id),
            users: self.role_users(role.id),
        }
    }

    fn user_with_roles(&self, user: &User) -> UserWithRoles {
        UserWithRoles::new(user.clone(), self.user_role_refs(user.id))
    }
}

fn sort_summaries(users: &mut [UserSummary]) {
    users.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.email.cmp(&b.email)));
}

/// Process-local [`RbacStore`].
#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RbacStore for InMemoryStore {
    async fn create_permission(&self, name: &str, guard_name: &str) -> StoreResult<Permission> {
        let mut state = self.state.write().await;
        state.ensure_permission_name_free(name, None)?;

        let now = Utc::now();
        let permission = Permission {
            id: PermissionId::new(),
            name: name.to_string(),
            guard_name: guard_name.to_string(),
            is_protected: is_protected_permission_name(name),
            created_at: now,
            updated_at: now,
        };
        state.permissions.insert(permission.id, permission.clone());
        Ok(permission)
    }

    async fn rename_permission(
        &self,
        id: PermissionId,
        new_name: &str,
    ) -> StoreResult<Permission> {
        let mut state = self.state.write().await;
        let current = state.permission(id)?.clone();
        if current.name == new_name {
            return Ok(current);
        }
        state.ensure_permission_name_free(new_name, Some(id))?;

        let permission = state
            .permissions
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(anyhow!("Permission not found")))?;
        permission.name = new_name.to_string();
        permission.updated_at = Utc::now();
        Ok(permission.clone())
    }

    async fn delete_permission(&self, id: PermissionId) -> StoreResult<()> {
        let mut state = self.state.write().await;
        let permission = state.permission(id)?;
        policy::ensure_permission_deletable(&permission.name, permission.is_protected)?;

        state.role_permissions.retain(|(_, p)| *p != id);
        state.permissions.remove(&id);
        Ok(())
    }

    async fn get_permission(&self, id: PermissionId) -> StoreResult<PermissionWithRoles> {
        let state = self.state.read().await;
        let permission = state.permission(id)?;
        Ok(state.permission_with_roles(permission))
    }

    async fn list_permissions(&self) -> StoreResult<Vec<PermissionWithRoles>> {
        let state = self.state.read().await;
        let mut permissions: Vec<&Permission> = state.permissions.values().collect();
        permissions.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(permissions
            .into_iter()
            .map(|p| state.permission_with_roles(p))
            .collect())
    }

    async fn create_role(
        &self,
        name: &str,
        description: Option<&str>,
        permission_ids: &[PermissionId],
    ) -> StoreResult<RoleWithRelations> {
        let mut state = self.state.write().await;
        state.ensure_role_name_free(name, None)?;
        let permission_ids = state.ensure_permissions_exist(permission_ids)?;

        let now = Utc::now();
        let role = Role {
            id: RoleId::new(),
            name: name.to_string(),
            description: description.map(str::to_string),
            is_protected: is_protected_role_name(name),
            created_at: now,
            updated_at: now,
        };
        state.roles.insert(role.id, role.clone());
        for permission_id in permission_ids {
            state.role_permissions.insert((role.id, permission_id));
        }
        Ok(state.role_with_relations(&role))
    }

    async fn update_role(
        &self,
        id: RoleId,
        name: &str,
        description: Option<&str>,
        permission_ids: &[PermissionId],
    ) -> StoreResult<RoleWithRelations> {
        let mut state = self.state.write().await;
        let current = state.role(id)?;
        policy::ensure_role_renamable(&current.name, current.is_protected, name)?;
        state.ensure_role_name_free(name, Some(id))?;
        let permission_ids = state.ensure_permissions_exist(permission_ids)?;

        let role = state
            .roles
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(anyhow!("Role not found")))?;
        role.name = name.to_string();
        role.description = description.map(str::to_string);
        role.updated_at = Utc::now();
        let role = role.clone();

        state.role_permissions.retain(|(r, _)| *r != id);
        for permission_id in permission_ids {
            state.role_permissions.insert((id, permission_id));
        }
        Ok(state.role_with_relations(&role))
    }

    async fn delete_role(&self, id: RoleId) -> StoreResult<()> {
        let mut state = self.state.write().await;
        let role = state.role(id)?;
        policy::ensure_role_deletable(&role.name, role.is_protected)?;

        state.role_permissions.retain(|(r, _)| *r != id);
        state.user_roles.retain(|(_, r)| *r != id);
        state.roles.remove(&id);
        Ok(())
    }

    async fn get_role(&self, id: RoleId) -> StoreResult<RoleWithRelations> {
        let state = self.state.read().await;
        let role = state.role(id)?;
        Ok(state.role_with_relations(role))
    }

    async fn find_role_by_name(&self, name: &str) -> StoreResult<Option<Role>> {
        let state = self.state.read().await;
        Ok(state.role_by_name(name).cloned())
    }

    async fn list_roles(&self) -> StoreResult<Vec<RoleWithRelations>> {
        let state = self.state.read().await;
        let mut roles: Vec<&Role> = state.roles.values().collect();
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(roles
            .into_iter()
            .map(|r| state.role_with_relations(r))
            .collect())
    }

    async fn add_member(&self, role_id: RoleId, user_id: UserId) -> StoreResult<()> {
        let mut state = self.state.write().await;
        let role_name = state.role(role_id)?.name.clone();
        state.user(user_id)?;
        if !state.user_roles.insert((user_id, role_id)) {
            return Err(AppError::already_member(anyhow!(
                "User already has the '{}' role",
                role_name
            )));
        }
        Ok(())
    }

    async fn remove_member(&self, role_id: RoleId, user_id: UserId) -> StoreResult<()> {
        let mut state = self.state.write().await;
        let role = state.role(role_id)?;
        policy::ensure_member_removable(
            &role.name,
            role.is_protected,
            state.is_member(role_id, user_id),
            state.member_count(role_id),
        )?;

        state.user_roles.remove(&(user_id, role_id));
        Ok(())
    }

    async fn list_role_members(&self, role_id: RoleId) -> StoreResult<Vec<UserSummary>> {
        let state = self.state.read().await;
        state.role(role_id)?;
        Ok(state.role_users(role_id))
    }

    async fn list_available_users(&self, role_id: RoleId) -> StoreResult<Vec<UserSummary>> {
        let state = self.state.read().await;
        state.role(role_id)?;
        Ok(state.available_users(role_id))
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<UserWithRoles> {
        let mut state = self.state.write().await;
        let role_id = state
            .role_by_name(&user.role_name)
            .map(|r| r.id)
            .ok_or_else(|| AppError::not_found(anyhow!("Role '{}' not found", user.role_name)))?;
        state.ensure_email_free(&user.email, None)?;

        let now = Utc::now();
        let record = User {
            id: UserId::new(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(record.id, record.clone());
        state.user_roles.insert((record.id, role_id));
        Ok(state.user_with_roles(&record))
    }

    async fn update_user(&self, id: UserId, changes: UserChanges) -> StoreResult<UserWithRoles> {
        let mut state = self.state.write().await;
        state.user(id)?;
        let role_id = state
            .role_by_name(&changes.role_name)
            .map(|r| r.id)
            .ok_or_else(|| {
                AppError::not_found(anyhow!("Role '{}' not found", changes.role_name))
            })?;
        state.ensure_email_free(&changes.email, Some(id))?;

        if let Some(super_admin) = state.super_admin_role() {
            policy::ensure_roles_replaceable(
                state.is_member(super_admin.id, id),
                super_admin.id == role_id,
                state.member_count(super_admin.id),
            )?;
        }

        let user = state
            .users
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(anyhow!("User not found")))?;
        user.name = changes.name;
        user.email = changes.email;
        if let Some(hash) = changes.password_hash {
            user.password_hash = hash;
        }
        user.updated_at = Utc::now();
        let user = user.clone();

        state.user_roles.retain(|(u, _)| *u != id);
        state.user_roles.insert((id, role_id));
        Ok(state.user_with_roles(&user))
    }

    async fn delete_user(&self, id: UserId) -> StoreResult<()> {
        let mut state = self.state.write().await;
        state.user(id)?;
        policy::ensure_user_deletable(state.holds_super_admin(id))?;

        state.user_roles.retain(|(u, _)| *u != id);
        state.users.remove(&id);
        Ok(())
    }

    async fn get_user(&self, id: UserId) -> StoreResult<UserWithRoles> {
        let state = self.state.read().await;
        let user = state.user(id)?;
        Ok(state.user_with_roles(user))
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self) -> StoreResult<Vec<UserWithRoles>> {
        let state = self.state.read().await;
        let mut users: Vec<&User> = state.users.values().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users.into_iter().map(|u| state.user_with_roles(u)).collect())
    }

    async fn user_roles(&self, id: UserId) -> StoreResult<Vec<RoleRef>> {
        let state = self.state.read().await;
        state.user(id)?;
        Ok(state.user_role_refs(id))
    }

    async fn effective_permissions(&self, id: UserId) -> StoreResult<Vec<String>> {
        let state = self.state.read().await;
        state.user(id)?;
        let names: BTreeSet<String> = state
            .user_roles
            .iter()
            .filter(|(u, _)| *u == id)
            .flat_map(|(_, role_id)| state.role_permissions(*role_id))
            .map(|p| p.name)
            .collect();
        Ok(names.into_iter().collect())
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
