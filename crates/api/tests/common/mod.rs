#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use storefront_api::config::{ServerConfig, IMAGE_URL_PREFIX};
use storefront_api::router::build_app_router;
use storefront_api::state::AppState;
use storefront_core::images::ImageStorageProvider;
use storefront_events::EventBus;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:4321".to_string()],
        request_timeout_secs: 30,
        image_storage_provider: ImageStorageProvider::Local,
        image_storage_dir: std::env::temp_dir().join("storefront-api-tests"),
        webhook_queue_capacity: 64,
        webhook_timeout_secs: 5,
        min_password_length: 8,
    }
}

/// Build the application router around `pool`, returning the event bus so
/// tests can subscribe to what handlers publish.
pub fn build_test_app_with_bus(pool: PgPool) -> (Router, Arc<EventBus>) {
    let config = test_config();
    let image_storer = config
        .image_storage_provider
        .build(PathBuf::from(&config.image_storage_dir), IMAGE_URL_PREFIX);
    let event_bus = Arc::new(EventBus::new(config.webhook_queue_capacity));

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        image_storer,
        event_bus: Arc::clone(&event_bus),
        http_client: reqwest::Client::new(),
    };

    (build_app_router(state, &config), event_bus)
}

/// Build the full application router with all middleware layers.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_bus(pool).0
}

async fn send(app: Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).unwrap())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn head(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::HEAD, uri, None).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn patch_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(body)).await
}

/// Read the whole response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// The two-option shirt used across tests: color x size.
pub fn shirt_body(sku: &str) -> serde_json::Value {
    serde_json::json!({
        "name": "Shirt",
        "sku": sku,
        "price": 19.99,
        "quantity": 10,
        "options": [
            {"name": "color", "values": ["red", "blue"]},
            {"name": "size", "values": ["S", "M"]},
        ],
    })
}

/// Create a shirt root and return its JSON.
pub async fn create_shirt(pool: &PgPool, sku: &str) -> serde_json::Value {
    let response = post_json(build_test_app(pool.clone()), "/v1/product", shirt_body(sku)).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await
}
