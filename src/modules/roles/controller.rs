use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use warden_core::{AppError, ErrorResponse};
use warden_models::{
    AddMemberDto, CreateRoleDto, RoleId, RoleMembers, RoleWithRelations, UpdateRoleDto, UserId,
};

use crate::middleware::auth::{RequireManageRoles, RequireViewRoles};
use crate::state::AppState;
use crate::validator::{ValidatedJson, ValidatedPath};

use super::service;

// ============ Role Endpoints ============

#[utoipa::path(
    get,
    path = "/api/roles",
    responses(
        (status = 200, description = "Roles with their permissions and users", body = Vec<RoleWithRelations>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Missing 'view roles'", body = ErrorResponse)
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
pub async fn list_roles(
    State(state): State<AppState>,
    _auth: RequireViewRoles,
) -> Result<Json<Vec<RoleWithRelations>>, AppError> {
    let roles = service::list_roles(state.store()).await?;
    Ok(Json(roles))
}

#[utoipa::path(
    post,
    path = "/api/roles",
    request_body = CreateRoleDto,
    responses(
        (status = 201, description = "Role created", body = RoleWithRelations),
        (status = 404, description = "Unknown permission id", body = ErrorResponse),
        (status = 409, description = "Name already taken", body = ErrorResponse),
        (status = 422, description = "Invalid input", body = ErrorResponse)
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
pub async fn create_role(
    State(state): State<AppState>,
    _auth: RequireManageRoles,
    ValidatedJson(dto): ValidatedJson<CreateRoleDto>,
) -> Result<(StatusCode, Json<RoleWithRelations>), AppError> {
    let role = service::create_role(state.store(), dto).await?;
    Ok((StatusCode::CREATED, Json(role)))
}

#[utoipa::path(
    get,
    path = "/api/roles/{id}",
    params(
        ("id" = Uuid, Path, description = "Role ID")
    ),
    responses(
        (status = 200, description = "Role details", body = RoleWithRelations),
        (status = 404, description = "Role not found", body = ErrorResponse)
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
pub async fn get_role(
    State(state): State<AppState>,
    _auth: RequireViewRoles,
    ValidatedPath(id): ValidatedPath<RoleId>,
) -> Result<Json<RoleWithRelations>, AppError> {
    let role = service::get_role(state.store(), id).await?;
    Ok(Json(role))
}

#[utoipa::path(
    put,
    path = "/api/roles/{id}",
    params(
        ("id" = Uuid, Path, description = "Role ID")
    ),
    request_body = UpdateRoleDto,
    responses(
        (status = 200, description = "Role updated", body = RoleWithRelations),
        (status = 403, description = "Protected role cannot be renamed", body = ErrorResponse),
        (status = 404, description = "Role or permission not found", body = ErrorResponse),
        (status = 409, description = "Name already taken", body = ErrorResponse)
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
pub async fn update_role(
    State(state): State<AppState>,
    _auth: RequireManageRoles,
    ValidatedPath(id): ValidatedPath<RoleId>,
    ValidatedJson(dto): ValidatedJson<UpdateRoleDto>,
) -> Result<Json<RoleWithRelations>, AppError> {
    let role = service::update_role(state.store(), id, dto).await?;
    Ok(Json(role))
}

#[utoipa::path(
    delete,
    path = "/api/roles/{id}",
    params(
        ("id" = Uuid, Path, description = "Role ID")
    ),
    responses(
        (status = 204, description = "Role deleted with its grants and memberships"),
        (status = 403, description = "Protected role", body = ErrorResponse),
        (status = 404, description = "Role not found", body = ErrorResponse)
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
pub async fn delete_role(
    State(state): State<AppState>,
    _auth: RequireManageRoles,
    ValidatedPath(id): ValidatedPath<RoleId>,
) -> Result<StatusCode, AppError> {
    service::delete_role(state.store(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============ Membership Endpoints ============

#[utoipa::path(
    get,
    path = "/api/roles/{id}/members",
    params(
        ("id" = Uuid, Path, description = "Role ID")
    ),
    responses(
        (status = 200, description = "Members and users available to add", body = RoleMembers),
        (status = 404, description = "Role not found", body = ErrorResponse)
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
pub async fn list_members(
    State(state): State<AppState>,
    _auth: RequireManageRoles,
    ValidatedPath(id): ValidatedPath<RoleId>,
) -> Result<Json<RoleMembers>, AppError> {
    let members = service::role_members(state.store(), id).await?;
    Ok(Json(members))
}

#[utoipa::path(
    post,
    path = "/api/roles/{id}/members",
    params(
        ("id" = Uuid, Path, description = "Role ID")
    ),
    request_body = AddMemberDto,
    responses(
        (status = 201, description = "Member added", body = RoleMembers),
        (status = 404, description = "Role or user not found", body = ErrorResponse),
        (status = 409, description = "User already holds the role", body = ErrorResponse)
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
pub async fn add_member(
    State(state): State<AppState>,
    _auth: RequireManageRoles,
    ValidatedPath(id): ValidatedPath<RoleId>,
    ValidatedJson(dto): ValidatedJson<AddMemberDto>,
) -> Result<(StatusCode, Json<RoleMembers>), AppError> {
    service::add_member(state.store(), id, dto.user_id).await?;
    let members = service::role_members(state.store(), id).await?;
    Ok((StatusCode::CREATED, Json(members)))
}

#[utoipa::path(
    delete,
    path = "/api/roles/{id}/members/{user_id}",
    params(
        ("id" = Uuid, Path, description = "Role ID"),
        ("user_id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "Member removed"),
        (status = 403, description = "Last member of the protected role", body = ErrorResponse),
        (status = 404, description = "User does not hold the role", body = ErrorResponse)
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
pub async fn remove_member(
    State(state): State<AppState>,
    _auth: RequireManageRoles,
    ValidatedPath((id, user_id)): ValidatedPath<(RoleId, UserId)>,
) -> Result<StatusCode, AppError> {
    service::remove_member(state.store(), id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
