//! Pagination parameters for list queries.

use serde::{Deserialize, Serialize};

const DEFAULT_LIMIT: u32 = 20;
const MAX_LIMIT: u32 = 100;

/// Normalized page/limit pair. Page is 1-based; limit is clamped to
/// `1..=100` with a default of 20, so repositories can trust the values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageParams {
    page: u32,
    limit: u32,
}

impl PageParams {
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        let page = match page {
            Some(p) if p >= 1 => p,
            _ => 1,
        };
        let limit = match limit {
            Some(l) if (1..=MAX_LIMIT).contains(&l) => l,
            _ => DEFAULT_LIMIT,
        };
        Self { page, limit }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of rows to skip for this page.
    pub fn offset(&self) -> u32 {
        (self.page - 1) * self.limit
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self::new(None, None)
    }
}
