//! # Warden Core
//!
//! Core types, errors, and the authorization policy for the Warden RBAC API.
//!
//! This crate provides foundational types used throughout the workspace:
//!
//! - [`errors`]: Typed application errors with HTTP response conversion
//! - [`password`]: Password hashing and verification (bcrypt)
//! - [`permissions`]: Protected resource identifiers and the default permission catalogue
//! - [`policy`]: Protection invariants checked at the boundary of every mutation
//! - [`validation`]: DTO validation shared by HTTP extractors and services
//!
//! # Example
//!
//! ```ignore
//! use warden_core::errors::{AppError, ErrorKind};
//! use warden_core::password::{hash_password, verify_password};
//! use warden_core::policy;
//!
//! let error = AppError::not_found(anyhow::anyhow!("Role not found"));
//! assert_eq!(error.kind(), ErrorKind::NotFound);
//!
//! let hash = hash_password("secure_password", bcrypt::DEFAULT_COST)?;
//! policy::ensure_role_deletable("editor", false)?;
//! ```

pub mod errors;
pub mod password;
pub mod permissions;
pub mod policy;
pub mod validation;

// Re-export commonly used types at crate root
pub use errors::{AppError, ErrorKind, ErrorResponse};
pub use password::{hash_password, verify_password};
pub use permissions::{ProtectedPermission, SUPER_ADMIN_ROLE};
pub use validation::validate_dto;
