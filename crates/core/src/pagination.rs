//! Pagination metadata and list request parameters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Pagination defaults
// ---------------------------------------------------------------------------

/// Default number of records per page.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Maximum number of records per page.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Clamp a user-provided limit to valid bounds.
pub fn clamp_limit(limit: u32) -> u32 {
    limit.clamp(1, MAX_PAGE_SIZE)
}

/// Clamp a user-provided page number (1-based).
pub fn clamp_page(page: u32) -> u32 {
    page.max(1)
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// Pagination metadata returned alongside a list page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u32,
}

impl Pagination {
    /// Build pagination for `total` records, deriving the page count.
    pub fn from_total(page: u32, limit: u32, total: u64) -> Self {
        let limit = clamp_limit(limit);
        Self {
            page: clamp_page(page),
            limit,
            total,
            pages: page_count(total, limit),
        }
    }

    /// Shift `total` by `delta` after a local insert or removal, keeping
    /// `pages` consistent. `total` never goes below zero.
    pub fn adjust_total(&mut self, delta: i64) {
        self.total = if delta.is_negative() {
            self.total.saturating_sub(delta.unsigned_abs())
        } else {
            self.total.saturating_add(delta as u64)
        };
        self.pages = page_count(self.total, self.limit);
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::from_total(1, DEFAULT_PAGE_SIZE, 0)
    }
}

fn page_count(total: u64, limit: u32) -> u32 {
    let limit = u64::from(limit.max(1));
    u32::try_from(total.div_ceil(limit)).unwrap_or(u32::MAX)
}

// ---------------------------------------------------------------------------
// ListParams
// ---------------------------------------------------------------------------

/// Parameters of a paginated list request.
///
/// Filters are passed through to the API as query parameters; a sorted map
/// keeps the generated query string stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListParams {
    pub page: u32,
    pub limit: u32,
    #[serde(default)]
    pub filters: BTreeMap<String, String>,
}

impl ListParams {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: clamp_page(page),
            limit: clamp_limit(limit),
            filters: BTreeMap::new(),
        }
    }

    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    /// Copy of these params with page and limit clamped to valid bounds.
    pub fn normalized(&self) -> Self {
        Self {
            page: clamp_page(self.page),
            limit: clamp_limit(self.limit),
            filters: self.filters.clone(),
        }
    }

    /// Flatten into `(key, value)` query pairs: `page`, `limit`, then filters.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let normalized = self.normalized();
        let mut pairs = vec![
            ("page".to_string(), normalized.page.to_string()),
            ("limit".to_string(), normalized.limit.to_string()),
        ];
        pairs.extend(
            normalized
                .filters
                .into_iter()
                .filter(|(key, _)| key != "page" && key != "limit"),
        );
        pairs
    }
}

impl Default for ListParams {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}
