use axum::{
    Json,
    extract::State,
};
use warden_core::{AppError, ErrorResponse};
use warden_models::{UserId, UserPermissions};

use crate::middleware::auth::RequireViewUsers;
use crate::state::AppState;
use crate::validator::ValidatedPath;

use super::service;

#[utoipa::path(
    get,
    path = "/api/users/{id}/permissions",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Effective permissions of the user", body = UserPermissions),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Authorization",
    security(("bearer_auth" = []))
)]
pub async fn get_user_permissions(
    State(state): State<AppState>,
    _auth: RequireViewUsers,
    ValidatedPath(id): ValidatedPath<UserId>,
) -> Result<Json<UserPermissions>, AppError> {
    let permissions = service::effective_permissions(state.store(), id).await?;
    Ok(Json(permissions))
}
