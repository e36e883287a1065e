//! Route definitions for product roots and products.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{option, product, product_root};
use crate::state::AppState;

/// ```text
/// GET    /product_roots                -> product_root::list
/// GET    /product_root/{id}            -> product_root::get_by_id
/// DELETE /product_root/{id}            -> product_root::delete
/// GET    /product_root/{id}/options    -> option::list_by_root
/// POST   /product_root/{id}/options    -> option::create
/// GET    /products                     -> product::list
/// POST   /product                      -> product_root::create
/// GET    /product/{sku}                -> product::get_by_sku
/// HEAD   /product/{sku}                -> product::exists
/// PATCH  /product/{sku}                -> product::update
/// DELETE /product/{sku}                -> product::delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/product_roots", get(product_root::list))
        .route(
            "/product_root/{id}",
            get(product_root::get_by_id).delete(product_root::delete),
        )
        .route(
            "/product_root/{id}/options",
            get(option::list_by_root).post(option::create),
        )
        .route("/products", get(product::list))
        .route("/product", post(product_root::create))
        .route(
            "/product/{sku}",
            get(product::get_by_sku)
                .head(product::exists)
                .patch(product::update)
                .delete(product::delete),
        )
}
