use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    create_student, delete_student, get_all_students, get_student, update_student,
};

pub fn init_students_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_student).get(get_all_students))
        .route(
            "/{id}",
            get(get_student).patch(update_student).delete(delete_student),
        )
}
