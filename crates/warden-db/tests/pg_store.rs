#![cfg(feature = "pg-tests")]

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tokio::sync::{Mutex, MutexGuard};
use warden_core::ErrorKind;
use warden_db::{PostgresStore, RbacStore, run_migrations};
use warden_models::{NewUser, UserChanges};

// Every test truncates the shared database, so they run one at a time.
static SERIAL: Mutex<()> = Mutex::const_new(());

async fn pg_store() -> Option<(PostgresStore, MutexGuard<'static, ()>)> {
    let guard = SERIAL.lock().await;
    let url = match std::env::var("WARDEN_TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!("skipping pg-tests: set WARDEN_TEST_DATABASE_URL or DATABASE_URL");
            return None;
        }
    };

    let pool = match PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(2))
        .connect(&url)
        .await
    {
        Ok(pool) => pool,
        Err(err) => {
            eprintln!("skipping pg-tests: cannot connect to postgres: {err}");
            return None;
        }
    };

    run_migrations(&pool).await.expect("migrations");
    sqlx::query("TRUNCATE user_roles, role_permissions, users, roles, permissions")
        .execute(&pool)
        .await
        .expect("truncate");

    Some((PostgresStore::new(pool), guard))
}

fn new_user(email: &str, role: &str) -> NewUser {
    NewUser {
        name: email.to_string(),
        email: email.to_string(),
        password_hash: "$2b$04$placeholder".to_string(),
        role_name: role.to_string(),
    }
}

#[tokio::test]
async fn duplicate_permission_is_rejected_by_constraint() {
    let Some((store, _guard)) = pg_store().await else {
        return;
    };

    store.create_permission("view users", "web").await.unwrap();
    let err = store
        .create_permission("view users", "web")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateName);

    let all = store.list_permissions().await.unwrap();
    assert_eq!(all.iter().filter(|p| p.permission.name == "view users").count(), 1);
}

#[tokio::test]
async fn protected_permission_keeps_its_grants() {
    let Some((store, _guard)) = pg_store().await else {
        return;
    };

    let manage = store.create_permission("manage roles", "web").await.unwrap();
    let role = store.create_role("editor", None, &[manage.id]).await.unwrap();

    let err = store.delete_permission(manage.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ProtectedResource);

    let role = store.get_role(role.role.id).await.unwrap();
    assert_eq!(role.permissions.len(), 1);
    assert_eq!(role.permissions[0].id, manage.id);
}

#[tokio::test]
async fn super_admin_role_and_members_are_protected() {
    let Some((store, _guard)) = pg_store().await else {
        return;
    };

    let super_admin = store.create_role("super-admin", None, &[]).await.unwrap();
    store.create_role("viewer", None, &[]).await.unwrap();
    let first = store
        .create_user(new_user("first@example.com", "super-admin"))
        .await
        .unwrap();

    let err = store.delete_role(super_admin.role.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ProtectedResource);

    let err = store.delete_user(first.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ProtectedResource);

    let err = store
        .remove_member(super_admin.role.id, first.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ProtectedResource);

    let err = store
        .update_user(
            first.id,
            UserChanges {
                name: "first".to_string(),
                email: "first@example.com".to_string(),
                password_hash: None,
                role_name: "viewer".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ProtectedResource);

    let second = store
        .create_user(new_user("second@example.com", "viewer"))
        .await
        .unwrap();
    store.add_member(super_admin.role.id, second.id).await.unwrap();
    store
        .remove_member(super_admin.role.id, first.id)
        .await
        .unwrap();

    let members = store.list_role_members(super_admin.role.id).await.unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].id, second.id);
}

#[tokio::test]
async fn role_delete_cascades_and_update_replaces_permissions() {
    let Some((store, _guard)) = pg_store().await else {
        return;
    };

    let view = store.create_permission("view users", "web").await.unwrap();
    let edit = store.create_permission("edit users", "web").await.unwrap();
    let editor = store
        .create_role("editor", None, &[view.id, edit.id])
        .await
        .unwrap();
    let other = store.create_role("other", None, &[]).await.unwrap();
    let user = store
        .create_user(new_user("u@example.com", "editor"))
        .await
        .unwrap();

    let updated = store
        .update_role(editor.role.id, "editor", None, &[])
        .await
        .unwrap();
    assert!(updated.permissions.is_empty());
    assert_eq!(store.effective_permissions(user.id).await.unwrap().len(), 0);

    let available_before = store.list_available_users(other.role.id).await.unwrap().len();
    store.delete_role(editor.role.id).await.unwrap();

    let dangling: i64 = sqlx::query_scalar(
        "SELECT (SELECT COUNT(*) FROM user_roles WHERE role_id = $1) + (SELECT COUNT(*) FROM role_permissions WHERE role_id = $1)",
    )
    .bind(editor.role.id)
    .fetch_one(store.pool())
    .await
    .unwrap();
    assert_eq!(dangling, 0);
    assert_eq!(
        store.list_available_users(other.role.id).await.unwrap().len(),
        available_before
    );
}

#[tokio::test]
async fn effective_permissions_union_roles() {
    let Some((store, _guard)) = pg_store().await else {
        return;
    };

    let view_users = store.create_permission("view users", "web").await.unwrap();
    let edit_users = store.create_permission("edit users", "web").await.unwrap();
    let view_roles = store.create_permission("view roles", "web").await.unwrap();
    store
        .create_role("admin", None, &[view_users.id, edit_users.id])
        .await
        .unwrap();
    let viewer = store
        .create_role("viewer", None, &[view_roles.id, view_users.id])
        .await
        .unwrap();
    let user = store
        .create_user(new_user("both@example.com", "admin"))
        .await
        .unwrap();
    store.add_member(viewer.role.id, user.id).await.unwrap();

    let permissions = store.effective_permissions(user.id).await.unwrap();
    assert_eq!(permissions, vec!["edit users", "view roles", "view users"]);
}
