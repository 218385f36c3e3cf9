//! Pagination window arithmetic shared by the client and subscription stores.

use serde::Serialize;

/// Page size used when a request leaves it unset.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Upper bound applied to requested page sizes.
pub const DEFAULT_MAX_PAGE_SIZE: usize = 1000;

/// Compute `(window_start, window_size)` for a 1-based page.
///
/// Page 0 is a caller error; it is clamped to the first page rather than
/// underflowing.
#[inline]
pub fn window(page: usize, page_size: usize) -> (usize, usize) {
    (page.saturating_sub(1).saturating_mul(page_size), page_size)
}

/// A validated 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub page_size: usize,
}

impl PageRequest {
    pub fn new(page: usize, page_size: usize) -> Self {
        Self { page, page_size }
    }

    /// Fill in unset request fields the way the admin API does.
    ///
    /// A page of 0 means the first page, a page size of 0 means
    /// `default_page_size`, and page sizes above `max_page_size` are capped.
    pub fn normalize(
        page: u32,
        page_size: u32,
        default_page_size: usize,
        max_page_size: usize,
    ) -> Self {
        let page = if page == 0 { 1 } else { page as usize };
        let page_size = match page_size as usize {
            0 => default_page_size,
            n => n.min(max_page_size),
        };
        Self { page, page_size }
    }

    #[inline]
    pub fn window(&self) -> (usize, usize) {
        window(self.page, self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

/// One page of records plus the total number of live records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: usize,
}

impl<T> Page<T> {
    pub fn empty(total_count: usize) -> Self {
        Self {
            items: Vec::new(),
            total_count,
        }
    }
}
