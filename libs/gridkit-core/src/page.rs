//! Offset/limit resolution and the list result envelope.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: i32 = 1;
pub const DEFAULT_PAGE_SIZE: i32 = 10;
/// Cap applied to queries that carry no explicit limit (`no_paging`).
pub const DEFAULT_SAFE_LIMIT: u64 = 100;

/// Resolved offset/limit for one list call. `None` means "no clause".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PagePlan {
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

impl PagePlan {
    /// Resolve the paging fields of a request. `no_paging` bypasses
    /// offset/limit entirely; otherwise non-positive values fall back to
    /// page 1 / page size 10 and `offset = (page - 1) * page_size`.
    pub fn from_request(no_paging: bool, page: i32, page_size: i32) -> Self {
        if no_paging {
            return Self::default();
        }
        let page = if page <= 0 { DEFAULT_PAGE } else { page };
        let page_size = if page_size <= 0 {
            DEFAULT_PAGE_SIZE
        } else {
            page_size
        };
        Self {
            offset: Some((page as u64 - 1) * page_size as u64),
            limit: Some(page_size as u64),
        }
    }

    /// Cap unbounded scans. Fills the limit only when none was set, so an
    /// explicit limit always wins; running it twice changes nothing.
    pub fn with_safe_limit(mut self, cap: u64) -> Self {
        if self.limit.is_none() {
            self.limit = Some(cap);
        }
        self
    }
}

/// Items plus the unpaged total — what every list endpoint returns.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ListPage<T> {
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> ListPage<T> {
    pub fn new(items: Vec<T>, total: u64) -> Self {
        Self { items, total }
    }

    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }

    /// Map items while keeping the total (row → DTO convenience).
    pub fn map_items<U>(self, mut f: impl FnMut(T) -> U) -> ListPage<U> {
        ListPage {
            items: self.items.into_iter().map(&mut f).collect(),
            total: self.total,
        }
    }
}
