//! Handlers for the `/webhooks` resource and its execution log.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use storefront_core::error::CoreError;
use storefront_core::pagination::ListResponse;
use storefront_core::types::DbId;
use storefront_db::models::webhook::{
    CreateWebhook, UpdateWebhook, Webhook, WebhookExecutionLog,
};
use storefront_db::repositories::{WebhookExecutionLogRepo, WebhookRepo};

use crate::error::{AppError, AppResult};
use crate::extract::ValidJson;
use crate::query::PageQuery;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "webhook",
        id,
    })
}

/// GET /v1/webhooks
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<PageQuery>,
) -> AppResult<Json<ListResponse<Webhook>>> {
    let page = params.page();
    let webhooks = WebhookRepo::list(&state.pool, page).await?;
    let count = WebhookRepo::count(&state.pool).await?;
    Ok(Json(ListResponse::new(page, count, webhooks)))
}

/// GET /v1/webhooks/{event_type}
pub async fn list_by_event_type(
    State(state): State<AppState>,
    Path(event_type): Path<String>,
    Query(params): Query<PageQuery>,
) -> AppResult<Json<ListResponse<Webhook>>> {
    let page = params.page();
    let webhooks = WebhookRepo::list_by_event_type(&state.pool, &event_type, page).await?;
    let count = WebhookRepo::count_by_event_type(&state.pool, &event_type).await?;
    Ok(Json(ListResponse::new(page, count, webhooks)))
}

/// POST /v1/webhook
pub async fn create(
    State(state): State<AppState>,
    ValidJson(input): ValidJson<CreateWebhook>,
) -> AppResult<(StatusCode, Json<Webhook>)> {
    let webhook = WebhookRepo::create(&state.pool, &input).await?;
    tracing::info!(
        webhook_id = webhook.id,
        event_type = %webhook.event_type,
        "Webhook registered"
    );
    Ok((StatusCode::CREATED, Json(webhook)))
}

/// PATCH /v1/webhook/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidJson(input): ValidJson<UpdateWebhook>,
) -> AppResult<Json<Webhook>> {
    let webhook = WebhookRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(webhook))
}

/// DELETE /v1/webhook/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Webhook>> {
    let webhook = WebhookRepo::archive(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(webhook))
}

/// GET /v1/webhook/{id}/executions
pub async fn list_executions(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<PageQuery>,
) -> AppResult<Json<ListResponse<WebhookExecutionLog>>> {
    WebhookRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let page = params.page();
    let logs = WebhookExecutionLogRepo::list_by_webhook(&state.pool, id, page).await?;
    let count = WebhookExecutionLogRepo::count_by_webhook(&state.pool, id).await?;
    Ok(Json(ListResponse::new(page, count, logs)))
}
