//! # Warden Auth
//!
//! Access tokens for the Warden admin API.
//!
//! Tokens only identify the caller. They carry no roles or permissions;
//! every request re-reads the caller's effective permissions from the store,
//! so a revoked grant takes effect on the next request.
//!
//! # Example
//!
//! ```ignore
//! use warden_auth::{create_access_token, verify_token};
//! use warden_config::JwtConfig;
//!
//! let config = JwtConfig::from_env();
//! let token = create_access_token(user_id, "admin@example.com", &config)?;
//! let claims = verify_token(&token, &config)?;
//! ```

pub mod claims;
pub mod jwt;

pub use claims::Claims;
pub use jwt::{create_access_token, verify_token};
