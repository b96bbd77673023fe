use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use warden_core::{AppError, ErrorResponse};
use warden_models::{CreatePermissionDto, Permission, PermissionId, PermissionWithRoles, RenamePermissionDto};

use crate::middleware::auth::RequireManagePermissions;
use crate::state::AppState;
use crate::validator::{ValidatedJson, ValidatedPath};

use super::service;

#[utoipa::path(
    get,
    path = "/api/permissions",
    responses(
        (status = 200, description = "Every permission with the roles granting it", body = Vec<PermissionWithRoles>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Missing 'manage permissions'", body = ErrorResponse)
    ),
    tag = "Permissions",
    security(("bearer_auth" = []))
)]
pub async fn list_permissions(
    State(state): State<AppState>,
    _auth: RequireManagePermissions,
) -> Result<Json<Vec<PermissionWithRoles>>, AppError> {
    let permissions = service::list_permissions(state.store()).await?;
    Ok(Json(permissions))
}

#[utoipa::path(
    post,
    path = "/api/permissions",
    request_body = CreatePermissionDto,
    responses(
        (status = 201, description = "Permission created", body = Permission),
        (status = 409, description = "Name already taken", body = ErrorResponse),
        (status = 422, description = "Invalid name", body = ErrorResponse)
    ),
    tag = "Permissions",
    security(("bearer_auth" = []))
)]
pub async fn create_permission(
    State(state): State<AppState>,
    _auth: RequireManagePermissions,
    ValidatedJson(dto): ValidatedJson<CreatePermissionDto>,
) -> Result<(StatusCode, Json<Permission>), AppError> {
    let permission =
        service::create_permission(state.store(), dto, &state.guard_config.default_guard)
            .await?;
    Ok((StatusCode::CREATED, Json(permission)))
}

#[utoipa::path(
    get,
    path = "/api/permissions/{id}",
    params(
        ("id" = Uuid, Path, description = "Permission ID")
    ),
    responses(
        (status = 200, description = "Permission details", body = PermissionWithRoles),
        (status = 404, description = "Permission not found", body = ErrorResponse)
    ),
    tag = "Permissions",
    security(("bearer_auth" = []))
)]
pub async fn get_permission(
    State(state): State<AppState>,
    _auth: RequireManagePermissions,
    ValidatedPath(id): ValidatedPath<PermissionId>,
) -> Result<Json<PermissionWithRoles>, AppError> {
    let permission = service::get_permission(state.store(), id).await?;
    Ok(Json(permission))
}

#[utoipa::path(
    put,
    path = "/api/permissions/{id}",
    params(
        ("id" = Uuid, Path, description = "Permission ID")
    ),
    request_body = RenamePermissionDto,
    responses(
        (status = 200, description = "Permission renamed", body = Permission),
        (status = 404, description = "Permission not found", body = ErrorResponse),
        (status = 409, description = "Name already taken", body = ErrorResponse)
    ),
    tag = "Permissions",
    security(("bearer_auth" = []))
)]
pub async fn rename_permission(
    State(state): State<AppState>,
    _auth: RequireManagePermissions,
    ValidatedPath(id): ValidatedPath<PermissionId>,
    ValidatedJson(dto): ValidatedJson<RenamePermissionDto>,
) -> Result<Json<Permission>, AppError> {
    let permission = service::rename_permission(state.store(), id, dto).await?;
    Ok(Json(permission))
}

#[utoipa::path(
    delete,
    path = "/api/permissions/{id}",
    params(
        ("id" = Uuid, Path, description = "Permission ID")
    ),
    responses(
        (status = 204, description = "Permission deleted and revoked from every role"),
        (status = 403, description = "Protected permission", body = ErrorResponse),
        (status = 404, description = "Permission not found", body = ErrorResponse)
    ),
    tag = "Permissions",
    security(("bearer_auth" = []))
)]
pub async fn delete_permission(
    State(state): State<AppState>,
    _auth: RequireManagePermissions,
    ValidatedPath(id): ValidatedPath<PermissionId>,
) -> Result<StatusCode, AppError> {
    service::delete_permission(state.store(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
