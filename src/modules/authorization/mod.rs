//! Effective-permission resolution for users.
//!
//! Grants reach a user only through roles. Nothing is cached: every check
//! reads the store, so revoking a permission from a role or removing a
//! member takes effect on the next request.

pub mod controller;
pub mod router;
pub mod service;
