use axum::routing::{get, post};
use axum::Router;

use crate::handlers::discount;
use crate::state::AppState;

/// ```text
/// GET    /discounts       -> list
/// POST   /discount        -> create
/// GET    /discount/{id}   -> get_by_id
/// PATCH  /discount/{id}   -> update
/// DELETE /discount/{id}   -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/discounts", get(discount::list))
        .route("/discount", post(discount::create))
        .route(
            "/discount/{id}",
            get(discount::get_by_id)
                .patch(discount::update)
                .delete(discount::delete),
        )
}
