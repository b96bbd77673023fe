//! Password hashing.
//!
//! Passwords are hashed with bcrypt, which salts every hash. Plaintext is
//! never persisted; the stored value is treated as opaque everywhere else.

use anyhow::anyhow;
use bcrypt::{hash, verify};

use crate::errors::AppError;

pub use bcrypt::DEFAULT_COST;

pub fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    hash(password, cost).map_err(|e| AppError::internal(anyhow!("Failed to hash password: {}", e)))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    verify(password, hash)
        .map_err(|e| AppError::internal(anyhow!("Failed to verify password: {}", e)))
}
