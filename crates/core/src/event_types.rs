//! Names of the catalog events that webhooks can subscribe to.

pub const PRODUCT_CREATED: &str = "product_created";
pub const PRODUCT_UPDATED: &str = "product_updated";
pub const PRODUCT_ARCHIVED: &str = "product_archived";

/// Every event type a webhook may register for.
pub const ALL: &[&str] = &[PRODUCT_CREATED, PRODUCT_UPDATED, PRODUCT_ARCHIVED];

pub fn is_known(event_type: &str) -> bool {
    ALL.contains(&event_type)
}
