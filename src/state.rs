use std::sync::Arc;

use warden_cli::seeder::{self, BootstrapConfig};
use warden_config::{
    CorsConfig, DatabaseConfig, GuardConfig, JwtConfig, PasswordConfig, StoreBackend,
};
use warden_core::AppError;
use warden_db::{RbacStore, connect_store};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RbacStore>,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
    pub password_config: PasswordConfig,
    pub guard_config: GuardConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn RbacStore>) -> Self {
        Self {
            store,
            jwt_config: JwtConfig::from_env(),
            cors_config: CorsConfig::from_env(),
            password_config: PasswordConfig::from_env(),
            guard_config: GuardConfig::from_env(),
        }
    }

    pub fn store(&self) -> &dyn RbacStore {
        self.store.as_ref()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("store", &self.store.backend_name())
            .field("jwt_config", &self.jwt_config)
            .field("cors_config", &self.cors_config)
            .field("password_config", &self.password_config)
            .field("guard_config", &self.guard_config)
            .finish()
    }
}

/// Connects the configured store. The in-memory backend starts empty, so it
/// is bootstrapped here.
pub async fn init_app_state() -> Result<AppState, AppError> {
    let db_config = DatabaseConfig::from_env();
    let store = connect_store(&db_config).await?;

    if db_config.backend == StoreBackend::Memory {
        seeder::bootstrap(store.as_ref(), &BootstrapConfig::from_env()).await?;
    }

    Ok(AppState::new(store))
}
