//! Page/limit handling for list endpoints.

use serde::Serialize;

/// Page size used when the client does not ask for one.
pub const DEFAULT_LIMIT: i64 = 25;

/// Largest page size a client may request.
pub const MAX_LIMIT: i64 = 50;

/// Resolved `page`/`limit` pair, always in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// 1-based page number.
    pub page: i64,
    pub limit: i64,
}

impl Page {
    /// Clamp raw query values: page to at least 1, limit to `1..=MAX_LIMIT`.
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: clamp_limit(limit, DEFAULT_LIMIT, MAX_LIMIT),
        }
    }

    /// Row offset for SQL `OFFSET`.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Clamp a user-provided limit into `1..=max`, falling back to `default`.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

/// `{count, limit, page, data}` envelope returned by list endpoints.
#[derive(Debug, Serialize)]
pub struct ListResponse<T: Serialize> {
    pub count: i64,
    pub limit: i64,
    pub page: i64,
    pub data: Vec<T>,
}

impl<T: Serialize> ListResponse<T> {
    pub fn new(page: Page, count: i64, data: Vec<T>) -> Self {
        Self {
            count,
            limit: page.limit,
            page: page.page,
            data,
        }
    }
}
