//! Background service that delivers catalog events to registered webhooks.
//!
//! [`WebhookDispatcher`] subscribes to the [`EventBus`](crate::EventBus),
//! looks up the live webhooks registered for each event type and POSTs the
//! event payload to each of them. Every attempt, successful or not, leaves
//! one row in `webhook_execution_logs`.
//!
//! The bus is bounded. When the dispatcher falls behind, the oldest events
//! are overwritten; the number lost is logged and added to
//! [`DispatcherStats::dropped_events`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use storefront_core::types::DbId;
use storefront_db::models::webhook::Webhook;
use storefront_db::repositories::{WebhookExecutionLogRepo, WebhookRepo};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::bus::StoreEvent;
use crate::delivery::webhook::{is_success, WebhookNotifier};

/// Status code recorded when the request never produced a response.
pub const TRANSPORT_FAILURE_STATUS: i32 = 0;

// ---------------------------------------------------------------------------
// WebhookStore
// ---------------------------------------------------------------------------

/// Webhook lookups and execution logging used by the dispatcher.
#[async_trait]
pub trait WebhookStore: Send + Sync {
    /// Live webhooks subscribed to `event_type`.
    async fn webhooks_for(&self, event_type: &str) -> Result<Vec<Webhook>, sqlx::Error>;

    /// Record the outcome of one delivery attempt.
    async fn record_execution(
        &self,
        webhook_id: DbId,
        status_code: i32,
        succeeded: bool,
    ) -> Result<(), sqlx::Error>;
}

#[async_trait]
impl WebhookStore for PgPool {
    async fn webhooks_for(&self, event_type: &str) -> Result<Vec<Webhook>, sqlx::Error> {
        WebhookRepo::list_all_by_event_type(self, event_type).await
    }

    async fn record_execution(
        &self,
        webhook_id: DbId,
        status_code: i32,
        succeeded: bool,
    ) -> Result<(), sqlx::Error> {
        WebhookExecutionLogRepo::create(self, webhook_id, status_code, succeeded).await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// DispatcherStats
// ---------------------------------------------------------------------------

/// Counters shared between the dispatcher task and whoever spawned it.
#[derive(Debug, Default)]
pub struct DispatcherStats {
    dropped: AtomicU64,
    attempts: AtomicU64,
}

impl DispatcherStats {
    /// Events lost because the dispatcher lagged behind the bus.
    pub fn dropped_events(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Delivery attempts made, successful or not.
    pub fn delivery_attempts(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }
}

// ---------------------------------------------------------------------------
// WebhookDispatcher
// ---------------------------------------------------------------------------

pub struct WebhookDispatcher<S, N> {
    store: S,
    notifier: N,
    stats: Arc<DispatcherStats>,
}

impl<S: WebhookStore, N: WebhookNotifier> WebhookDispatcher<S, N> {
    pub fn new(store: S, notifier: N) -> Self {
        Self {
            store,
            notifier,
            stats: Arc::new(DispatcherStats::default()),
        }
    }

    /// Handle to the dispatcher's counters. Stays valid after `run` returns.
    pub fn stats(&self) -> Arc<DispatcherStats> {
        Arc::clone(&self.stats)
    }

    /// Run the dispatch loop.
    ///
    /// Exits when the bus is closed (every sender dropped) or when `cancel`
    /// fires. On cancellation, events already buffered for this receiver are
    /// still delivered before returning.
    pub async fn run(
        self,
        mut receiver: broadcast::Receiver<StoreEvent>,
        cancel: CancellationToken,
    ) {
        tracing::info!("Webhook dispatcher started");

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    self.drain(&mut receiver).await;
                    tracing::info!("Webhook dispatcher cancelled");
                    break;
                }
                result = receiver.recv() => match result {
                    Ok(event) => self.dispatch(&event).await,
                    Err(broadcast::error::RecvError::Lagged(n)) => self.record_lag(n),
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::info!("Event bus closed, webhook dispatcher shutting down");
                        break;
                    }
                },
            }
        }
    }

    async fn drain(&self, receiver: &mut broadcast::Receiver<StoreEvent>) {
        loop {
            match receiver.try_recv() {
                Ok(event) => self.dispatch(&event).await,
                Err(broadcast::error::TryRecvError::Lagged(n)) => self.record_lag(n),
                Err(_) => break,
            }
        }
    }

    fn record_lag(&self, n: u64) {
        self.stats.dropped.fetch_add(n, Ordering::Relaxed);
        tracing::warn!(
            skipped = n,
            total_dropped = self.stats.dropped_events(),
            "Webhook dispatcher lagged, events dropped"
        );
    }

    /// Deliver one event to every webhook registered for its type.
    pub async fn dispatch(&self, event: &StoreEvent) {
        let webhooks = match self.store.webhooks_for(&event.event_type).await {
            Ok(webhooks) => webhooks,
            Err(e) => {
                tracing::error!(
                    event_type = %event.event_type,
                    error = %e,
                    "Failed to load webhooks for event"
                );
                return;
            }
        };

        for webhook in &webhooks {
            self.execute(webhook, &event.payload).await;
        }
    }

    async fn execute(&self, webhook: &Webhook, payload: &serde_json::Value) {
        self.stats.attempts.fetch_add(1, Ordering::Relaxed);

        let (status_code, succeeded) = match self.notifier.deliver(webhook, payload).await {
            Ok(status) => (i32::from(status), is_success(status)),
            Err(e) => {
                tracing::warn!(
                    webhook_id = webhook.id,
                    url = %webhook.url,
                    error = %e,
                    "Webhook delivery failed"
                );
                (TRANSPORT_FAILURE_STATUS, false)
            }
        };

        tracing::debug!(webhook_id = webhook.id, status_code, succeeded, "Webhook executed");

        if let Err(e) = self
            .store
            .record_execution(webhook.id, status_code, succeeded)
            .await
        {
            tracing::error!(
                webhook_id = webhook.id,
                error = %e,
                "Failed to record webhook execution"
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
