use anyhow::anyhow;
use tracing::instrument;
use warden_auth::create_access_token;
use warden_config::JwtConfig;
use warden_core::{AppError, ErrorKind, validate_dto};
use warden_db::RbacStore;
use warden_models::{LoginRequest, LoginResponse, MeResponse, UserId, UserWithRoles};
use warden_observability::{track_login_failure, track_login_success};

use crate::modules::authorization;
use crate::modules::users::service::authenticate;

pub struct AuthService;

impl AuthService {
    #[instrument(skip(store, dto, jwt_config), fields(email = %dto.email))]
    pub async fn login_user(
        store: &dyn RbacStore,
        dto: LoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<LoginResponse, AppError> {
        validate_dto(&dto)?;

        let user = match authenticate(store, &dto.email, &dto.password).await {
            Ok(user) => user,
            Err(e) => {
                if e.kind() == ErrorKind::Unauthorized {
                    track_login_failure("invalid_credentials");
                    tracing::warn!("login rejected");
                }
                return Err(e);
            }
        };

        let access_token = create_access_token(user.id.into_inner(), &user.email, jwt_config)?;
        let roles = store.user_roles(user.id).await?;

        track_login_success();
        tracing::info!(user_id = %user.id, "login succeeded");

        Ok(LoginResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: jwt_config.access_token_expiry,
            user: UserWithRoles::new(user, roles),
        })
    }

    /// The caller with roles and effective permissions read at request time.
    #[instrument(skip(store))]
    pub async fn me(store: &dyn RbacStore, user_id: UserId) -> Result<MeResponse, AppError> {
        let user = match store.get_user(user_id).await {
            Ok(user) => user,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(AppError::unauthorized(anyhow!("User no longer exists")));
            }
            Err(e) => return Err(e),
        };
        let resolved = authorization::service::effective_permissions(store, user_id).await?;

        Ok(MeResponse {
            user,
            is_super_admin: resolved.is_super_admin,
            permissions: resolved.permissions,
        })
    }
}
