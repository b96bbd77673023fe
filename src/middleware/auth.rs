use anyhow::anyhow;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use warden_auth::{Claims, verify_token};
use warden_core::{AppError, permissions};
use warden_models::UserId;

use crate::state::AppState;

/// Extractor that validates the bearer token and yields its claims.
///
/// The token only identifies the caller. Permission checks go through the
/// `Require*` extractors below, which read the store on every request.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn user_id(&self) -> Result<UserId, AppError> {
        self.0
            .user_uuid()
            .map(UserId::from_uuid)
            .ok_or_else(|| AppError::unauthorized(anyhow!("Invalid user ID in token")))
    }

    pub fn email(&self) -> &str {
        &self.0.email
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized(anyhow!("Missing authorization header")))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::unauthorized(anyhow!("Invalid authorization header format")))?;

        let claims = verify_token(token, &state.jwt_config)?;

        Ok(AuthUser(claims))
    }
}

/// Declares an extractor that admits the caller only if their effective
/// permissions, read fresh from the store, contain `$permission`.
#[macro_export]
macro_rules! require_permission {
    ($name:ident, $permission:expr) => {
        #[derive(Debug, Clone)]
        pub struct $name(pub $crate::middleware::auth::AuthUser);

        impl axum::extract::FromRequestParts<$crate::state::AppState> for $name {
            type Rejection = warden_core::AppError;

            async fn from_request_parts(
                parts: &mut axum::http::request::Parts,
                state: &$crate::state::AppState,
            ) -> Result<Self, Self::Rejection> {
                let auth_user = <$crate::middleware::auth::AuthUser as axum::extract::FromRequestParts<
                    $crate::state::AppState,
                >>::from_request_parts(parts, state)
                .await?;
                let user_id = auth_user.user_id()?;

                $crate::modules::authorization::service::ensure_permission(
                    state.store(),
                    user_id,
                    $permission,
                )
                .await?;

                Ok($name(auth_user))
            }
        }
    };
}

require_permission!(RequireManagePermissions, permissions::MANAGE_PERMISSIONS);

require_permission!(RequireViewRoles, permissions::VIEW_ROLES);
require_permission!(RequireManageRoles, permissions::MANAGE_ROLES);

require_permission!(RequireViewUsers, permissions::VIEW_USERS);
require_permission!(RequireCreateUsers, permissions::CREATE_USERS);
require_permission!(RequireEditUsers, permissions::EDIT_USERS);
require_permission!(RequireDeleteUsers, permissions::DELETE_USERS);
