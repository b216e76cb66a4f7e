use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::middleware::auth::authenticate;
use crate::state::AppState;

use super::controller::{login, me};

/// `/login` is public; `/me` sits behind the authentication gate.
pub fn init_auth_router(state: AppState) -> Router<AppState> {
    Router::new().route("/login", post(login)).merge(
        Router::new()
            .route("/me", get(me))
            .route_layer(middleware::from_fn_with_state(state, authenticate)),
    )
}
