//! Webhook and webhook execution log models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use storefront_core::types::{DbId, Timestamp};
use storefront_core::validation::{
    validate_webhook_content_type, validate_webhook_event_type, validate_webhook_url,
    WEBHOOK_CONTENT_TYPE_JSON,
};
use validator::Validate;

/// A row from the `webhooks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Webhook {
    pub id: DbId,
    pub url: String,
    pub event_type: String,
    pub content_type: String,
    pub created_on: Timestamp,
    pub updated_on: Option<Timestamp>,
    pub archived_on: Option<Timestamp>,
}

fn default_content_type() -> String {
    WEBHOOK_CONTENT_TYPE_JSON.to_string()
}

/// DTO for `POST /v1/webhook`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateWebhook {
    #[validate(custom(function = "validate_webhook_url"))]
    pub url: String,
    #[validate(custom(function = "validate_webhook_event_type"))]
    pub event_type: String,
    #[serde(default = "default_content_type")]
    #[validate(custom(function = "validate_webhook_content_type"))]
    pub content_type: String,
}

/// DTO for `PATCH /v1/webhook/{id}`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateWebhook {
    #[validate(custom(function = "validate_webhook_url"))]
    pub url: Option<String>,
    #[validate(custom(function = "validate_webhook_event_type"))]
    pub event_type: Option<String>,
    #[validate(custom(function = "validate_webhook_content_type"))]
    pub content_type: Option<String>,
}

/// A row from the `webhook_execution_logs` table. One per delivery attempt.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WebhookExecutionLog {
    pub id: DbId,
    pub webhook_id: DbId,
    pub status_code: i32,
    pub succeeded: bool,
    pub executed_on: Timestamp,
}
