mod common;

use axum::http::{Method, StatusCode};
use common::{
    app, bootstrapped_state, insert_user, permission_id, permission_ids, send, super_admin,
    super_admin_token, token_for,
};
use serde_json::json;
use warden::modules::roles::service;
use warden_core::ErrorKind;
use warden_core::permissions::{
    ADMIN_ROLE, EDIT_USERS, SUPER_ADMIN_ROLE, VIEW_ROLES, VIEW_USERS,
};
use warden_models::{CreateRoleDto, PermissionId, RoleId, UpdateRoleDto, UserId};

fn create_dto(name: &str, permission_ids: Vec<PermissionId>) -> CreateRoleDto {
    CreateRoleDto {
        name: name.to_string(),
        description: None,
        permission_ids,
    }
}

fn update_dto(name: &str, permission_ids: Vec<PermissionId>) -> UpdateRoleDto {
    UpdateRoleDto {
        name: name.to_string(),
        description: Some("updated".to_string()),
        permission_ids,
    }
}

async fn role_id(state: &warden::state::AppState, name: &str) -> RoleId {
    state
        .store()
        .find_role_by_name(name)
        .await
        .unwrap()
        .unwrap()
        .id
}

#[tokio::test]
async fn test_create_role_with_permissions() {
    let state = bootstrapped_state().await;
    let ids = permission_ids(&state, &[VIEW_USERS, EDIT_USERS]).await;

    let role = service::create_role(state.store(), create_dto(" editor ", ids))
        .await
        .unwrap();

    assert_eq!(role.role.name, "editor");
    assert!(!role.role.is_protected);
    let names: Vec<&str> = role.permissions.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec![EDIT_USERS, VIEW_USERS]);
    assert!(role.users.is_empty());
}

#[tokio::test]
async fn test_create_role_duplicate_name() {
    let state = bootstrapped_state().await;

    let err = service::create_role(state.store(), create_dto(ADMIN_ROLE, vec![]))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DuplicateName);
}

#[tokio::test]
async fn test_create_role_unknown_permission_writes_nothing() {
    let state = bootstrapped_state().await;
    let mut ids = permission_ids(&state, &[VIEW_USERS]).await;
    ids.push(PermissionId::new());

    let err = service::create_role(state.store(), create_dto("editor", ids))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(
        state
            .store()
            .find_role_by_name("editor")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_update_role_replaces_permission_set() {
    let state = bootstrapped_state().await;
    let ids = permission_ids(&state, &[VIEW_USERS, EDIT_USERS]).await;
    let role = service::create_role(state.store(), create_dto("editor", ids))
        .await
        .unwrap();
    let view_roles = permission_id(&state, VIEW_ROLES).await;

    let updated = service::update_role(state.store(), role.role.id, update_dto("editor", vec![view_roles]))
        .await
        .unwrap();

    let names: Vec<&str> = updated.permissions.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec![VIEW_ROLES]);
    assert_eq!(updated.role.description.as_deref(), Some("updated"));
}

#[tokio::test]
async fn test_update_role_with_empty_set_revokes_everything() {
    let state = bootstrapped_state().await;
    let admin_id = role_id(&state, ADMIN_ROLE).await;
    let user = insert_user(&state, "staff@example.com", ADMIN_ROLE).await;
    assert!(!state.store().effective_permissions(user.id).await.unwrap().is_empty());

    let updated = service::update_role(state.store(), admin_id, update_dto(ADMIN_ROLE, vec![]))
        .await
        .unwrap();

    assert!(updated.permissions.is_empty());
    let reloaded = service::get_role(state.store(), admin_id).await.unwrap();
    assert!(reloaded.permissions.is_empty());
    assert!(state.store().effective_permissions(user.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_super_admin_permission_set_can_be_updated() {
    let state = bootstrapped_state().await;
    let id = role_id(&state, SUPER_ADMIN_ROLE).await;
    let ids = permission_ids(&state, &[VIEW_USERS]).await;

    let updated = service::update_role(state.store(), id, update_dto(SUPER_ADMIN_ROLE, ids))
        .await
        .unwrap();

    assert_eq!(updated.permissions.len(), 1);
}

#[tokio::test]
async fn test_super_admin_cannot_be_renamed() {
    let state = bootstrapped_state().await;
    let id = role_id(&state, SUPER_ADMIN_ROLE).await;

    let err = service::update_role(state.store(), id, update_dto("root", vec![]))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ProtectedResource);
    let role = service::get_role(state.store(), id).await.unwrap();
    assert_eq!(role.role.name, SUPER_ADMIN_ROLE);
    assert!(!role.permissions.is_empty());
}

#[tokio::test]
async fn test_update_role_to_taken_name() {
    let state = bootstrapped_state().await;
    let id = role_id(&state, ADMIN_ROLE).await;

    let err = service::update_role(state.store(), id, update_dto(SUPER_ADMIN_ROLE, vec![]))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DuplicateName);
}

#[tokio::test]
async fn test_super_admin_role_is_never_deleted() {
    let state = bootstrapped_state().await;
    let id = role_id(&state, SUPER_ADMIN_ROLE).await;
    let before = service::get_role(state.store(), id).await.unwrap();

    let err = service::delete_role(state.store(), id).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ProtectedResource);
    let after = service::get_role(state.store(), id).await.unwrap();
    assert_eq!(after.role.name, before.role.name);
    assert_eq!(after.permissions.len(), before.permissions.len());
    assert_eq!(after.users, before.users);
}

#[tokio::test]
async fn test_delete_role_cascades() {
    let state = bootstrapped_state().await;
    let ids = permission_ids(&state, &[VIEW_USERS, EDIT_USERS]).await;
    let editor = service::create_role(state.store(), create_dto("editor", ids))
        .await
        .unwrap();
    let user = insert_user(&state, "editor@example.com", "editor").await;
    let admin_id = role_id(&state, ADMIN_ROLE).await;
    let available_before = service::list_available_users(state.store(), admin_id)
        .await
        .unwrap()
        .len();

    service::delete_role(state.store(), editor.role.id).await.unwrap();

    let err = service::get_role(state.store(), editor.role.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(state.store().user_roles(user.id).await.unwrap().is_empty());
    for permission in state.store().list_permissions().await.unwrap() {
        assert!(permission.roles.iter().all(|r| r.id != editor.role.id));
    }
    assert_eq!(
        service::list_available_users(state.store(), admin_id)
            .await
            .unwrap()
            .len(),
        available_before
    );
}

#[tokio::test]
async fn test_delete_unknown_role() {
    let state = bootstrapped_state().await;

    let err = service::delete_role(state.store(), RoleId::new()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
}

// ============ Membership ============

#[tokio::test]
async fn test_add_member_and_available_users() {
    let state = bootstrapped_state().await;
    let admin_id = role_id(&state, ADMIN_ROLE).await;
    let root = super_admin(&state).await;

    let available = service::list_available_users(state.store(), admin_id).await.unwrap();
    assert!(available.iter().any(|u| u.id == root.id));

    service::add_member(state.store(), admin_id, root.id).await.unwrap();

    let members = service::role_members(state.store(), admin_id).await.unwrap();
    assert!(members.members.iter().any(|u| u.id == root.id));
    assert!(members.available_users.iter().all(|u| u.id != root.id));
}

#[tokio::test]
async fn test_add_member_twice_is_rejected() {
    let state = bootstrapped_state().await;
    let admin_id = role_id(&state, ADMIN_ROLE).await;
    let user = insert_user(&state, "staff@example.com", ADMIN_ROLE).await;

    let err = service::add_member(state.store(), admin_id, user.id).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::AlreadyMember);
    let members = state.store().list_role_members(admin_id).await.unwrap();
    assert_eq!(members.iter().filter(|u| u.id == user.id).count(), 1);
}

#[tokio::test]
async fn test_add_member_unknown_user_or_role() {
    let state = bootstrapped_state().await;
    let admin_id = role_id(&state, ADMIN_ROLE).await;
    let root = super_admin(&state).await;

    let err = service::add_member(state.store(), admin_id, UserId::new()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = service::add_member(state.store(), RoleId::new(), root.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_remove_non_member() {
    let state = bootstrapped_state().await;
    let admin_id = role_id(&state, ADMIN_ROLE).await;
    let root = super_admin(&state).await;

    let err = service::remove_member(state.store(), admin_id, root.id).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_last_super_admin_cannot_be_removed() {
    let state = bootstrapped_state().await;
    let id = role_id(&state, SUPER_ADMIN_ROLE).await;
    let root = super_admin(&state).await;

    let err = service::remove_member(state.store(), id, root.id).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ProtectedResource);
    let members = state.store().list_role_members(id).await.unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].id, root.id);
}

#[tokio::test]
async fn test_super_admin_member_removed_when_another_remains() {
    let state = bootstrapped_state().await;
    let id = role_id(&state, SUPER_ADMIN_ROLE).await;
    let root = super_admin(&state).await;
    let second = insert_user(&state, "second@example.com", SUPER_ADMIN_ROLE).await;

    service::remove_member(state.store(), id, root.id).await.unwrap();

    let members = state.store().list_role_members(id).await.unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].id, second.id);

    let err = service::remove_member(state.store(), id, second.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ProtectedResource);
}

// ============ HTTP ============

#[tokio::test]
async fn test_http_delete_super_admin_role_forbidden() {
    let state = bootstrapped_state().await;
    let token = super_admin_token(&state).await;
    let id = role_id(&state, SUPER_ADMIN_ROLE).await;

    let (status, body) = send(
        app(&state),
        Method::DELETE,
        &format!("/api/roles/{}", id),
        Some(&token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["kind"], "protected_resource");
}

#[tokio::test]
async fn test_http_role_crud() {
    let state = bootstrapped_state().await;
    let token = super_admin_token(&state).await;
    let view_users = permission_id(&state, VIEW_USERS).await;

    let (status, body) = send(
        app(&state),
        Method::POST,
        "/api/roles",
        Some(&token),
        Some(json!({ "name": "auditor", "permission_ids": [view_users] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "auditor");
    assert_eq!(body["permissions"][0]["name"], VIEW_USERS);
    let id = body["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        app(&state),
        Method::PUT,
        &format!("/api/roles/{}", id),
        Some(&token),
        Some(json!({ "name": "auditor", "permission_ids": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["permissions"].as_array().unwrap().len(), 0);

    let (status, _) = send(
        app(&state),
        Method::DELETE,
        &format!("/api/roles/{}", id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(
        app(&state),
        Method::GET,
        &format!("/api/roles/{}", id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");
}

#[tokio::test]
async fn test_http_membership() {
    let state = bootstrapped_state().await;
    let token = super_admin_token(&state).await;
    let id = role_id(&state, SUPER_ADMIN_ROLE).await;
    let root = super_admin(&state).await;
    let user = insert_user(&state, "staff@example.com", ADMIN_ROLE).await;

    let (status, body) = send(
        app(&state),
        Method::POST,
        &format!("/api/roles/{}/members", id),
        Some(&token),
        Some(json!({ "user_id": user.id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["members"].as_array().unwrap().len(), 2);

    let (status, body) = send(
        app(&state),
        Method::POST,
        &format!("/api/roles/{}/members", id),
        Some(&token),
        Some(json!({ "user_id": user.id })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "already_member");

    let (status, _) = send(
        app(&state),
        Method::DELETE,
        &format!("/api/roles/{}/members/{}", id, root.id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // The caller just left super-admin, so continue as the remaining member.
    let token = token_for(&state, user.id, &user.email);
    let (status, body) = send(
        app(&state),
        Method::GET,
        &format!("/api/roles/{}/members", id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["members"].as_array().unwrap().len(), 1);
    assert_eq!(body["members"][0]["email"], "staff@example.com");
    assert!(
        body["available_users"]
            .as_array()
            .unwrap()
            .iter()
            .any(|u| u["email"] == "admin@example.com")
    );
}

#[tokio::test]
async fn test_http_malformed_ids_are_validation_errors() {
    let state = bootstrapped_state().await;
    let token = super_admin_token(&state).await;
    let role = role_id(&state, "admin").await;

    let (status, body) = send(app(&state), Method::GET, "/api/roles/42", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "validation");

    let (status, body) = send(
        app(&state),
        Method::DELETE,
        &format!("/api/roles/{}/members/not-a-uuid", role),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "validation");
}
