//! Query parameters of resource list endpoints.

use serde::{Deserialize, Serialize};

use crudhub_core::error::AppError;
use crudhub_core::types::pagination::DEFAULT_PAGE_SIZE;
use crudhub_core::types::{PageRequest, SortField};

/// `?search=..&all=..&page=..&size=..&sort=field,dir&sort=..`
///
/// Deserialize with `axum_extra::extract::Query` so that repeated `sort`
/// parameters collect into a list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListParams {
    /// Free-text search key.
    pub search: Option<String>,
    /// Return every matching entity without paging.
    #[serde(default)]
    pub all: bool,
    /// Page number (1-based, default: 1).
    pub page: Option<u64>,
    /// Items per page (default: 20, max: 100).
    pub size: Option<u64>,
    /// Sort keys in priority order.
    #[serde(default)]
    pub sort: Vec<String>,
}

impl ListParams {
    /// The trimmed search key, `None` when absent or blank.
    pub fn search_key(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    /// Page requested by the caller, clamped to valid bounds.
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(
            self.page.unwrap_or(1),
            self.size.unwrap_or(DEFAULT_PAGE_SIZE),
        )
    }

    /// Parsed sort keys.
    pub fn sort_fields(&self) -> Result<Vec<SortField>, AppError> {
        SortField::parse_all(&self.sort)
    }
}
