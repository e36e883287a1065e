use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront_api::config::{ServerConfig, IMAGE_URL_PREFIX};
use storefront_api::router::build_app_router;
use storefront_api::state::AppState;
use storefront_events::{EventBus, HttpWebhookNotifier, WebhookDispatcher};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storefront_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = storefront_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    storefront_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    storefront_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Image storage ---
    tokio::fs::create_dir_all(&config.image_storage_dir)
        .await
        .expect("Failed to create image storage directory");
    let image_storer = config
        .image_storage_provider
        .build(config.image_storage_dir.clone(), IMAGE_URL_PREFIX);
    tracing::info!(
        provider = %config.image_storage_provider,
        dir = %config.image_storage_dir.display(),
        "Image storer ready"
    );

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::new(config.webhook_queue_capacity));
    tracing::info!(capacity = config.webhook_queue_capacity, "Event bus created");

    // Spawn the webhook dispatcher (delivers catalog events to webhooks).
    let webhook_timeout = Duration::from_secs(config.webhook_timeout_secs);
    let dispatcher =
        WebhookDispatcher::new(pool.clone(), HttpWebhookNotifier::new(webhook_timeout));
    let dispatcher_stats = dispatcher.stats();
    let dispatcher_cancel = tokio_util::sync::CancellationToken::new();
    let dispatcher_handle = tokio::spawn(
        dispatcher.run(event_bus.subscribe(), dispatcher_cancel.clone()),
    );

    // --- App state ---
    let http_client = reqwest::Client::builder()
        .timeout(webhook_timeout)
        .build()
        .expect("Failed to build reqwest HTTP client");

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        image_storer,
        event_bus: Arc::clone(&event_bus),
        http_client,
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    // Deliver what is already queued, then stop.
    dispatcher_cancel.cancel();
    drop(event_bus);
    let _ = tokio::time::timeout(Duration::from_secs(5), dispatcher_handle).await;
    tracing::info!(
        delivery_attempts = dispatcher_stats.delivery_attempts(),
        dropped_events = dispatcher_stats.dropped_events(),
        "Webhook dispatcher stopped"
    );

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
