use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use warden_core::{AppError, ErrorResponse};
use warden_models::{CreateUserDto, UpdateUserDto, UserId, UserWithRoles};

use crate::middleware::auth::{
    RequireCreateUsers, RequireDeleteUsers, RequireEditUsers, RequireViewUsers,
};
use crate::state::AppState;
use crate::validator::{ValidatedJson, ValidatedPath};

use super::service;

#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "Users with their roles, newest first", body = Vec<UserWithRoles>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Missing 'view users'", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
pub async fn list_users(
    State(state): State<AppState>,
    _auth: RequireViewUsers,
) -> Result<Json<Vec<UserWithRoles>>, AppError> {
    let users = service::list_users(state.store()).await?;
    Ok(Json(users))
}

#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserDto,
    responses(
        (status = 201, description = "User created", body = UserWithRoles),
        (status = 403, description = "Assigning 'super-admin' without 'manage roles'", body = ErrorResponse),
        (status = 404, description = "Unknown role", body = ErrorResponse),
        (status = 409, description = "Email already taken", body = ErrorResponse),
        (status = 422, description = "Invalid input", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
pub async fn create_user(
    State(state): State<AppState>,
    auth: RequireCreateUsers,
    ValidatedJson(dto): ValidatedJson<CreateUserDto>,
) -> Result<(StatusCode, Json<UserWithRoles>), AppError> {
    let actor = auth.0.user_id()?;
    let user = service::create_user(
        state.store(),
        actor,
        dto,
        state.password_config.bcrypt_cost,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User details", body = UserWithRoles),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
pub async fn get_user(
    State(state): State<AppState>,
    _auth: RequireViewUsers,
    ValidatedPath(id): ValidatedPath<UserId>,
) -> Result<Json<UserWithRoles>, AppError> {
    let user = service::get_user(state.store(), id).await?;
    Ok(Json(user))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body = UpdateUserDto,
    responses(
        (status = 200, description = "User updated", body = UserWithRoles),
        (status = 403, description = "Would remove the last super admin, or touches a super admin without 'manage roles'", body = ErrorResponse),
        (status = 404, description = "User or role not found", body = ErrorResponse),
        (status = 409, description = "Email already taken", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
pub async fn update_user(
    State(state): State<AppState>,
    auth: RequireEditUsers,
    ValidatedPath(id): ValidatedPath<UserId>,
    ValidatedJson(dto): ValidatedJson<UpdateUserDto>,
) -> Result<Json<UserWithRoles>, AppError> {
    let actor = auth.0.user_id()?;
    let user = service::update_user(
        state.store(),
        actor,
        id,
        dto,
        state.password_config.bcrypt_cost,
    )
    .await?;
    Ok(Json(user))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "User deleted"),
        (status = 403, description = "User holds the protected role", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
pub async fn delete_user(
    State(state): State<AppState>,
    _auth: RequireDeleteUsers,
    ValidatedPath(id): ValidatedPath<UserId>,
) -> Result<StatusCode, AppError> {
    service::delete_user(state.store(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
