use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{
    create_permission, delete_permission, get_permission, list_permissions, rename_permission,
};

pub fn init_permissions_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_permissions).post(create_permission))
        .route(
            "/{id}",
            get(get_permission)
                .put(rename_permission)
                .delete(delete_permission),
        )
}
