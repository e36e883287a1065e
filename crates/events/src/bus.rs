//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`StoreEvent`]s. It is
//! shared via `Arc<EventBus>` across the application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// StoreEvent
// ---------------------------------------------------------------------------

/// A catalog change that webhooks can subscribe to.
///
/// The payload is the affected entity exactly as the API returned it; it is
/// what webhooks receive as their request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreEvent {
    /// One of [`storefront_core::event_types`], e.g. `"product_created"`.
    pub event_type: String,

    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl StoreEvent {
    /// Create an event with an empty object payload.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Set the JSON payload for the event.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    /// Build an event whose payload is `entity` serialized to JSON.
    pub fn for_entity<T: Serialize>(
        event_type: impl Into<String>,
        entity: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self::new(event_type).with_payload(serde_json::to_value(entity)?))
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
pub const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// When the buffer is full the oldest unconsumed events are overwritten and
/// slow receivers observe `RecvError::Lagged` with the number they missed.
pub struct EventBus {
    sender: broadcast::Sender<StoreEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// With no subscribers the event is dropped.
    pub fn publish(&self, event: StoreEvent) {
        if self.sender.send(event).is_err() {
            tracing::debug!("No event subscribers, event dropped");
        }
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
