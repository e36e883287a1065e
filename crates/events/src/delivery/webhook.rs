//! Webhook delivery over HTTP.
//!
//! [`HttpWebhookNotifier`] POSTs an event payload to a webhook's URL with the
//! webhook's content type. Each call is exactly one attempt; the dispatcher
//! records the outcome of every attempt.

use std::time::Duration;

use async_trait::async_trait;
use storefront_db::models::webhook::Webhook;

/// Default HTTP request timeout for a single delivery attempt.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Whether a webhook response status counts as a successful delivery.
///
/// The accepted range is `200..=300`.
pub fn is_success(status: u16) -> bool {
    (200..=300).contains(&status)
}

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for webhook delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The payload could not be encoded for the webhook's content type.
    #[error("Failed to encode webhook payload: {0}")]
    Encode(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// WebhookNotifier
// ---------------------------------------------------------------------------

/// Sends one event payload to one webhook.
///
/// Returns the HTTP status code the endpoint answered with, whatever it was.
/// Transport failures are errors.
#[async_trait]
pub trait WebhookNotifier: Send + Sync {
    async fn deliver(
        &self,
        webhook: &Webhook,
        payload: &serde_json::Value,
    ) -> Result<u16, WebhookError>;
}

// ---------------------------------------------------------------------------
// HttpWebhookNotifier
// ---------------------------------------------------------------------------

/// Delivers payloads with a shared `reqwest` client.
pub struct HttpWebhookNotifier {
    client: reqwest::Client,
}

impl HttpWebhookNotifier {
    /// Create a notifier whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { client }
    }
}

impl Default for HttpWebhookNotifier {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

#[async_trait]
impl WebhookNotifier for HttpWebhookNotifier {
    async fn deliver(
        &self,
        webhook: &Webhook,
        payload: &serde_json::Value,
    ) -> Result<u16, WebhookError> {
        let body = serde_json::to_vec(payload)?;
        let response = self
            .client
            .post(&webhook.url)
            .header(reqwest::header::CONTENT_TYPE, &webhook.content_type)
            .body(body)
            .send()
            .await?;
        Ok(response.status().as_u16())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
