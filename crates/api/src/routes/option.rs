use axum::routing::{patch, post};
use axum::Router;

use crate::handlers::option;
use crate::state::AppState;

/// ```text
/// PATCH  /product_options/{id}         -> update
/// DELETE /product_options/{id}         -> delete
/// POST   /product_options/{id}/value   -> create_value
/// PATCH  /product_option_values/{id}   -> update_value
/// DELETE /product_option_values/{id}   -> delete_value
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/product_options/{id}",
            patch(option::update).delete(option::delete),
        )
        .route("/product_options/{id}/value", post(option::create_value))
        .route(
            "/product_option_values/{id}",
            patch(option::update_value).delete(option::delete_value),
        )
}
