pub mod discount;
pub mod option;
pub mod product;
pub mod product_root;
pub mod user;
pub mod webhook;

use serde::Serialize;
use storefront_events::StoreEvent;

use crate::state::AppState;

/// Publish `entity` as the payload of an `event_type` event.
///
/// Called after the change has committed. A payload that fails to serialize
/// is logged and skipped; it never fails the request.
pub(crate) fn publish_event<T: Serialize>(state: &AppState, event_type: &str, entity: &T) {
    match StoreEvent::for_entity(event_type, entity) {
        Ok(event) => state.event_bus.publish(event),
        Err(e) => tracing::error!(event_type, error = %e, "Failed to serialize event payload"),
    }
}
