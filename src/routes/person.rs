//! Person CRUD routes.

use crate::handlers::person::{create_person, delete_person, get_person, list_persons, update_person};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn person_routes(state: AppState) -> Router {
    Router::new()
        .route("/persons", get(list_persons).post(create_person))
        .route(
            "/persons/:id",
            get(get_person).put(update_person).delete(delete_person),
        )
        .with_state(state)
}
