//! # Warden Config
//!
//! Configuration types for Warden, loaded from environment variables:
//!
//! - [`database`]: store backend selection and Postgres pool settings
//! - [`jwt`]: access token signing configuration
//! - [`cors`]: CORS (Cross-Origin Resource Sharing) configuration
//! - [`password`]: bcrypt cost
//! - [`guard`]: default guard for new permissions
//! - [`server`]: bind address
//!
//! # Example
//!
//! ```ignore
//! use warden_config::{CorsConfig, DatabaseConfig, JwtConfig};
//!
//! let db_config = DatabaseConfig::from_env();
//! let jwt_config = JwtConfig::from_env();
//! let cors_config = CorsConfig::from_env();
//! ```

pub mod cors;
pub mod database;
pub mod guard;
pub mod jwt;
pub mod password;
pub mod server;

pub use cors::CorsConfig;
pub use database::{DatabaseConfig, StoreBackend};
pub use guard::GuardConfig;
pub use jwt::JwtConfig;
pub use password::PasswordConfig;
pub use server::ServerConfig;
