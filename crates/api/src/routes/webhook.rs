use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::webhook;
use crate::state::AppState;

/// ```text
/// GET    /webhooks                  -> list
/// GET    /webhooks/{event_type}     -> list_by_event_type
/// POST   /webhook                   -> create
/// PATCH  /webhook/{id}              -> update
/// DELETE /webhook/{id}              -> delete
/// GET    /webhook/{id}/executions   -> list_executions
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/webhooks", get(webhook::list))
        .route("/webhooks/{event_type}", get(webhook::list_by_event_type))
        .route("/webhook", post(webhook::create))
        .route(
            "/webhook/{id}",
            patch(webhook::update).delete(webhook::delete),
        )
        .route("/webhook/{id}/executions", get(webhook::list_executions))
}
