//! Repository for the `webhook_execution_logs` table.

use sqlx::PgPool;
use storefront_core::pagination::Page;
use storefront_core::types::DbId;

use crate::models::webhook::WebhookExecutionLog;

const COLUMNS: &str = "id, webhook_id, status_code, succeeded, executed_on";

/// Append-only record of webhook delivery attempts.
pub struct WebhookExecutionLogRepo;

impl WebhookExecutionLogRepo {
    pub async fn create(
        pool: &PgPool,
        webhook_id: DbId,
        status_code: i32,
        succeeded: bool,
    ) -> Result<WebhookExecutionLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO webhook_execution_logs (webhook_id, status_code, succeeded)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WebhookExecutionLog>(&query)
            .bind(webhook_id)
            .bind(status_code)
            .bind(succeeded)
            .fetch_one(pool)
            .await
    }

    /// One page of a webhook's executions, newest first.
    pub async fn list_by_webhook(
        pool: &PgPool,
        webhook_id: DbId,
        page: Page,
    ) -> Result<Vec<WebhookExecutionLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM webhook_execution_logs WHERE webhook_id = $1
             ORDER BY executed_on DESC, id DESC LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, WebhookExecutionLog>(&query)
            .bind(webhook_id)
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(pool)
            .await
    }

    pub async fn count_by_webhook(pool: &PgPool, webhook_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM webhook_execution_logs WHERE webhook_id = $1")
            .bind(webhook_id)
            .fetch_one(pool)
            .await
    }
}
