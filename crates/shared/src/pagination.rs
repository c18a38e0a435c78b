//! Page-based pagination utilities.

use serde::Serialize;
use thiserror::Error;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PER_PAGE: usize = 10;

/// Upper bound on the page size a caller may request.
pub const MAX_PER_PAGE: usize = 100;

/// Error type for pagination parameters.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaginationError {
    #[error("Page must be at least 1")]
    InvalidPage,
    #[error("Items per page must be between 1 and {max}")]
    InvalidPerPage { max: usize },
}

/// A validated page request (1-based page number).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: usize,
    per_page: usize,
}

impl PageRequest {
    /// Creates a page request, rejecting a zero page or an out-of-range page size.
    pub fn new(page: usize, per_page: usize) -> Result<Self, PaginationError> {
        Self::with_limit(page, per_page, MAX_PER_PAGE)
    }

    /// Creates a page request with a custom page-size ceiling.
    pub fn with_limit(
        page: usize,
        per_page: usize,
        max_per_page: usize,
    ) -> Result<Self, PaginationError> {
        if page == 0 {
            return Err(PaginationError::InvalidPage);
        }
        if per_page == 0 || per_page > max_per_page {
            return Err(PaginationError::InvalidPerPage { max: max_per_page });
        }
        Ok(Self { page, per_page })
    }

    /// Builds a page request from optional query parameters.
    pub fn from_query(
        page: Option<usize>,
        per_page: Option<usize>,
        default_per_page: usize,
        max_per_page: usize,
    ) -> Result<Self, PaginationError> {
        Self::with_limit(
            page.unwrap_or(1),
            per_page.unwrap_or(default_per_page),
            max_per_page,
        )
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn per_page(&self) -> usize {
        self.per_page
    }

    /// Number of items skipped before this page starts.
    ///
    /// Saturates for very large page numbers, which then read as past the end.
    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

/// Pagination info for list responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub total_pages: usize,
}

/// One page of results.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: PageInfo,
}

/// Slices an already filtered and sorted list down to the requested page.
///
/// A page past the end yields an empty `data` with accurate totals.
pub fn paginate<T>(items: Vec<T>, request: PageRequest) -> Page<T> {
    let total = items.len();
    let total_pages = total.div_ceil(request.per_page);
    let data = items
        .into_iter()
        .skip(request.offset())
        .take(request.per_page)
        .collect();

    Page {
        data,
        pagination: PageInfo {
            page: request.page,
            per_page: request.per_page,
            total,
            total_pages,
        },
    }
}
