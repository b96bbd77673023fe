//! Request extractors for authentication and authorization.
//!
//! # Authentication Flow
//!
//! 1. Client sends request with `Authorization: Bearer <token>` header
//! 2. `AuthUser` extractor validates the JWT and extracts claims
//! 3. A `Require*` extractor loads the caller's effective permissions from
//!    the store and checks the one the route needs
//! 4. Handler executes if all checks pass
//!
//! # Example
//!
//! ```ignore
//! use crate::middleware::auth::{AuthUser, RequireManageRoles};
//!
//! // Any valid token
//! async fn me(auth_user: AuthUser) -> impl IntoResponse { /* ... */ }
//!
//! // Only callers whose roles grant "manage roles"
//! async fn delete_role(RequireManageRoles(auth_user): RequireManageRoles) { /* ... */ }
//! ```

pub mod auth;
