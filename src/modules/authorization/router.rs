use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::get_user_permissions;

/// Mounted under `/api/users`.
pub fn init_user_permissions_router() -> Router<AppState> {
    Router::new().route("/{id}/permissions", get(get_user_permissions))
}
