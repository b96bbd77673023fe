pub mod auth;
pub mod authorization;
pub mod permissions;
pub mod roles;
pub mod users;

use warden_core::{AppError, ErrorKind};
use warden_observability::{track_mutation, track_protected_rejection};

/// Records the outcome of a store mutation in the RBAC counters.
pub(crate) fn observe<T>(
    entity: &'static str,
    op: &'static str,
    result: Result<T, AppError>,
) -> Result<T, AppError> {
    match &result {
        Ok(_) => track_mutation(entity, op),
        Err(e) if e.kind() == ErrorKind::ProtectedResource => track_protected_rejection(entity),
        Err(_) => {}
    }
    result
}
