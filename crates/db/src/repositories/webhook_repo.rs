//! Repository for the `webhooks` table.

use sqlx::PgPool;
use storefront_core::pagination::Page;
use storefront_core::types::DbId;

use crate::models::webhook::{CreateWebhook, UpdateWebhook, Webhook};

const COLUMNS: &str = "id, url, event_type, content_type, created_on, updated_on, archived_on";

/// Provides CRUD operations for webhooks.
pub struct WebhookRepo;

impl WebhookRepo {
    pub async fn create(pool: &PgPool, input: &CreateWebhook) -> Result<Webhook, sqlx::Error> {
        let query = format!(
            "INSERT INTO webhooks (url, event_type, content_type) VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Webhook>(&query)
            .bind(input.url.trim())
            .bind(&input.event_type)
            .bind(input.content_type.to_ascii_lowercase())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Webhook>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM webhooks WHERE id = $1 AND archived_on IS NULL");
        sqlx::query_as::<_, Webhook>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool, page: Page) -> Result<Vec<Webhook>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM webhooks WHERE archived_on IS NULL
             ORDER BY id LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, Webhook>(&query)
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM webhooks WHERE archived_on IS NULL")
            .fetch_one(pool)
            .await
    }

    /// One page of the live webhooks registered for `event_type`.
    pub async fn list_by_event_type(
        pool: &PgPool,
        event_type: &str,
        page: Page,
    ) -> Result<Vec<Webhook>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM webhooks WHERE event_type = $1 AND archived_on IS NULL
             ORDER BY id LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Webhook>(&query)
            .bind(event_type)
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(pool)
            .await
    }

    pub async fn count_by_event_type(pool: &PgPool, event_type: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM webhooks WHERE event_type = $1 AND archived_on IS NULL",
        )
        .bind(event_type)
        .fetch_one(pool)
        .await
    }

    /// Every live webhook for `event_type`. Used by the dispatcher.
    pub async fn list_all_by_event_type(
        pool: &PgPool,
        event_type: &str,
    ) -> Result<Vec<Webhook>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM webhooks WHERE event_type = $1 AND archived_on IS NULL
             ORDER BY id"
        );
        sqlx::query_as::<_, Webhook>(&query)
            .bind(event_type)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateWebhook,
    ) -> Result<Option<Webhook>, sqlx::Error> {
        let query = format!(
            "UPDATE webhooks SET
                url = COALESCE($2, url),
                event_type = COALESCE($3, event_type),
                content_type = COALESCE($4, content_type),
                updated_on = NOW()
             WHERE id = $1 AND archived_on IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Webhook>(&query)
            .bind(id)
            .bind(input.url.as_deref().map(str::trim))
            .bind(&input.event_type)
            .bind(input.content_type.as_deref().map(str::to_ascii_lowercase))
            .fetch_optional(pool)
            .await
    }

    pub async fn archive(pool: &PgPool, id: DbId) -> Result<Option<Webhook>, sqlx::Error> {
        let query = format!(
            "UPDATE webhooks SET archived_on = NOW()
             WHERE id = $1 AND archived_on IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Webhook>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
