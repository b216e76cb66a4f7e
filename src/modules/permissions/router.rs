use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    create_permission, delete_permission, get_all_permissions, get_permission,
    get_permissions_by_user, update_permission,
};

pub fn init_permissions_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_permission).get(get_all_permissions))
        .route("/user/{user_id}", get(get_permissions_by_user))
        .route(
            "/{id}",
            get(get_permission)
                .patch(update_permission)
                .delete(delete_permission),
        )
}
