use axum::routing::{get, post};
use axum::Router;

use crate::handlers::user;
use crate::state::AppState;

/// ```text
/// POST   /user        -> create
/// GET    /user/{id}   -> get_by_id
/// PATCH  /user/{id}   -> update
/// DELETE /user/{id}   -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/user", post(user::create))
        .route(
            "/user/{id}",
            get(user::get_by_id).patch(user::update).delete(user::delete),
        )
}
