//! Shared query parameter types for API handlers.

use serde::Deserialize;
use storefront_core::pagination::Page;

/// Pagination parameters (`?page=&limit=`).
///
/// Clamped into range by [`Page::new`].
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageQuery {
    pub fn page(&self) -> Page {
        Page::new(self.page, self.limit)
    }
}
