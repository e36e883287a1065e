//! HTTP-level integration tests for webhooks and their delivery log.

mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::StatusCode;
use common::{
    body_json, build_test_app, build_test_app_with_bus, delete, get, patch_json, post_json,
    shirt_body,
};
use serde_json::json;
use sqlx::PgPool;
use storefront_db::models::webhook::Webhook;
use storefront_events::{WebhookDispatcher, WebhookError, WebhookNotifier};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

async fn register(pool: &PgPool, event_type: &str) -> serde_json::Value {
    let response = post_json(
        build_test_app(pool.clone()),
        "/v1/webhook",
        json!({"url": " https://hooks.example.com/catalog ", "event_type": event_type}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

#[sqlx::test(migrations = "../db/migrations")]
async fn register_and_list_webhooks(pool: PgPool) {
    let created = register(&pool, "product_created").await;
    assert_eq!(created["url"], "https://hooks.example.com/catalog");
    assert_eq!(created["content_type"], "application/json");
    register(&pool, "product_archived").await;

    let response = get(build_test_app(pool.clone()), "/v1/webhooks").await;
    assert_eq!(body_json(response).await["count"], 2);

    let response = get(build_test_app(pool.clone()), "/v1/webhooks/product_archived").await;
    let json = body_json(response).await;
    assert_eq!(json["count"], 1);
    assert_eq!(json["data"][0]["event_type"], "product_archived");

    let response = get(build_test_app(pool), "/v1/webhooks/product_updated").await;
    assert_eq!(body_json(response).await["count"], 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn invalid_webhooks_are_rejected(pool: PgPool) {
    for body in [
        json!({"url": "ftp://hooks.example.com", "event_type": "product_created"}),
        json!({"url": "https://hooks.example.com", "event_type": "order_placed"}),
        json!({"url": "https://hooks.example.com", "event_type": "product_created", "content_type": "application/xml"}),
    ] {
        let response = post_json(build_test_app(pool.clone()), "/v1/webhook", body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn update_and_archive_webhook(pool: PgPool) {
    let created = register(&pool, "product_created").await;
    let id = created["id"].as_i64().unwrap();

    let response = patch_json(
        build_test_app(pool.clone()),
        &format!("/v1/webhook/{id}"),
        json!({"event_type": "product_updated"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["event_type"], "product_updated");
    assert_eq!(json["url"], "https://hooks.example.com/catalog");

    let response = delete(build_test_app(pool.clone()), &format!("/v1/webhook/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = patch_json(
        build_test_app(pool),
        &format!("/v1/webhook/{id}"),
        json!({"event_type": "product_created"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// Records deliveries instead of making HTTP calls.
#[derive(Clone, Default)]
struct RecordingNotifier {
    delivered: Arc<Mutex<Vec<(i64, serde_json::Value)>>>,
}

#[async_trait]
impl WebhookNotifier for RecordingNotifier {
    async fn deliver(
        &self,
        webhook: &Webhook,
        payload: &serde_json::Value,
    ) -> Result<u16, WebhookError> {
        self.delivered
            .lock()
            .await
            .push((webhook.id, payload.clone()));
        Ok(200)
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn product_creation_is_delivered_and_logged(pool: PgPool) {
    let hook = register(&pool, "product_created").await;
    let hook_id = hook["id"].as_i64().unwrap();
    register(&pool, "product_archived").await;

    let (app, bus) = build_test_app_with_bus(pool.clone());
    let notifier = RecordingNotifier::default();
    let dispatcher = WebhookDispatcher::new(pool.clone(), notifier.clone());
    let stats = dispatcher.stats();
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(dispatcher.run(bus.subscribe(), cancel.clone()));

    let response = post_json(app, "/v1/product", shirt_body("shirt")).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(10), handle)
        .await
        .expect("dispatcher should stop")
        .unwrap();

    assert_eq!(stats.delivery_attempts(), 1);
    assert_eq!(stats.dropped_events(), 0);
    let delivered = notifier.delivered.lock().await;
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].0, hook_id);
    assert_eq!(delivered[0].1["sku_prefix"], "shirt");

    let response = get(
        build_test_app(pool),
        &format!("/v1/webhook/{hook_id}/executions"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["count"], 1);
    assert_eq!(json["data"][0]["status_code"], 200);
    assert_eq!(json["data"][0]["succeeded"], true);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn executions_of_missing_webhook_is_not_found(pool: PgPool) {
    let response = get(build_test_app(pool), "/v1/webhook/31337/executions").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
