use std::sync::Arc;

use storefront_core::images::ImageStorer;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: storefront_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Backend that stores image renditions, chosen by `IMAGE_STORAGE_PROVIDER`.
    pub image_storer: Arc<dyn ImageStorer>,
    /// Catalog events published here reach the webhook dispatcher.
    pub event_bus: Arc<storefront_events::EventBus>,
    /// Client used to fetch `url` image payloads.
    pub http_client: reqwest::Client,
}
