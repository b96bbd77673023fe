//! # Warden DB
//!
//! Persistence for the RBAC model.
//!
//! - [`store::RbacStore`]: the storage contract every backend implements
//! - [`store::postgres::PostgresStore`]: durable backend (sqlx + Postgres)
//! - [`store::memory::InMemoryStore`]: process-local backend for development
//!   and tests
//!
//! # Example
//!
//! ```ignore
//! use warden_config::DatabaseConfig;
//! use warden_db::connect_store;
//!
//! let store = connect_store(&DatabaseConfig::from_env()).await?;
//! let permissions = store.list_permissions().await?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use sqlx::postgres::PgPoolOptions;
use warden_config::{DatabaseConfig, StoreBackend};
use warden_core::AppError;

pub mod store;

pub use sqlx::PgPool;
pub use store::RbacStore;
pub use store::memory::InMemoryStore;
pub use store::postgres::PostgresStore;

/// Embedded schema migrations.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Opens a Postgres pool sized from `config`.
pub async fn init_db_pool(config: &DatabaseConfig) -> Result<PgPool, AppError> {
    let url = config
        .url
        .as_deref()
        .ok_or_else(|| AppError::internal(anyhow!("DATABASE_URL must be set")))?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(url)
        .await?;

    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    MIGRATOR.run(pool).await?;
    tracing::info!("database migrations applied");
    Ok(())
}

/// Builds the backend selected by `config`, running migrations for Postgres.
pub async fn connect_store(config: &DatabaseConfig) -> Result<Arc<dyn RbacStore>, AppError> {
    match config.backend {
        StoreBackend::Postgres => {
            let pool = init_db_pool(config).await?;
            run_migrations(&pool).await?;
            Ok(Arc::new(PostgresStore::new(pool)))
        }
        StoreBackend::Memory => {
            tracing::warn!("using in-memory store; all data is lost on restart");
            Ok(Arc::new(InMemoryStore::new()))
        }
    }
}
