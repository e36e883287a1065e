//! Storefront event bus and webhook delivery.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`StoreEvent`]: the catalog event envelope.
//! - [`delivery`]: outbound HTTP webhook calls.
//! - [`WebhookDispatcher`]: background service that fans events out to the
//!   webhooks registered for them and logs every attempt.

pub mod bus;
pub mod delivery;
pub mod dispatcher;

pub use bus::{EventBus, StoreEvent};
pub use delivery::webhook::{HttpWebhookNotifier, WebhookError, WebhookNotifier};
pub use dispatcher::{DispatcherStats, WebhookDispatcher, WebhookStore};
