pub mod discount;
pub mod health;
pub mod option;
pub mod product;
pub mod user;
pub mod webhook;

use axum::Router;

use crate::state::AppState;

/// Build the `/v1` route tree.
///
/// ```text
/// /product_roots                         list roots with products
/// /product_root/{id}                     get, archive
/// /product_root/{id}/options             list, create
/// /products                              list
/// /product                               create root + variants
/// /product/{sku}                         get, head, patch, archive
///
/// /product_options/{id}                  patch, archive
/// /product_options/{id}/value            create value
/// /product_option_values/{id}            patch, archive
///
/// /discounts                             list
/// /discount                              create
/// /discount/{id}                         get, patch, archive
///
/// /webhooks                              list
/// /webhooks/{event_type}                 list by event
/// /webhook                               create
/// /webhook/{id}                          patch, archive
/// /webhook/{id}/executions               execution log
///
/// /user                                  create
/// /user/{id}                             get, patch, archive
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(product::router())
        .merge(option::router())
        .merge(discount::router())
        .merge(webhook::router())
        .merge(user::router())
}
