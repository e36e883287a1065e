use std::path::PathBuf;

use storefront_core::images::ImageStorageProvider;

/// URL path the image storage directory is served under.
pub const IMAGE_URL_PREFIX: &str = "/product_images";

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development except the
/// database URL, which `main` reads separately.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `4321`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    pub image_storage_provider: ImageStorageProvider,
    /// Directory stored image renditions are written to.
    pub image_storage_dir: PathBuf,
    /// Events buffered for the webhook dispatcher before the oldest are dropped.
    pub webhook_queue_capacity: usize,
    /// Timeout for one webhook request, in seconds. Also used for image URL fetches.
    pub webhook_timeout_secs: u64,
    pub min_password_length: usize,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                  |
    /// |--------------------------|--------------------------|
    /// | `HOST`                   | `0.0.0.0`                |
    /// | `PORT`                   | `4321`                   |
    /// | `CORS_ORIGINS`           | `http://localhost:4321`  |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                     |
    /// | `IMAGE_STORAGE_PROVIDER` | `local`                  |
    /// | `IMAGE_STORAGE_DIR`      | `product_images`         |
    /// | `WEBHOOK_QUEUE_CAPACITY` | `256`                    |
    /// | `WEBHOOK_TIMEOUT_SECS`   | `10`                     |
    /// | `MIN_PASSWORD_LENGTH`    | `8`                      |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "4321".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:4321".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let image_storage_provider: ImageStorageProvider =
            std::env::var("IMAGE_STORAGE_PROVIDER")
                .unwrap_or_else(|_| "local".into())
                .parse()
                .unwrap_or_else(|e| panic!("IMAGE_STORAGE_PROVIDER is invalid: {e}"));

        let image_storage_dir = PathBuf::from(
            std::env::var("IMAGE_STORAGE_DIR").unwrap_or_else(|_| "product_images".into()),
        );

        let webhook_queue_capacity: usize = std::env::var("WEBHOOK_QUEUE_CAPACITY")
            .unwrap_or_else(|_| "256".into())
            .parse()
            .expect("WEBHOOK_QUEUE_CAPACITY must be a valid usize");

        let webhook_timeout_secs: u64 = std::env::var("WEBHOOK_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".into())
            .parse()
            .expect("WEBHOOK_TIMEOUT_SECS must be a valid u64");

        let min_password_length: usize = std::env::var("MIN_PASSWORD_LENGTH")
            .unwrap_or_else(|_| "8".into())
            .parse()
            .expect("MIN_PASSWORD_LENGTH must be a valid usize");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            image_storage_provider,
            image_storage_dir,
            webhook_queue_capacity,
            webhook_timeout_secs,
            min_password_length,
        }
    }
}
