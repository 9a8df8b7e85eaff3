//! Page request parameters for the paged search.

use serde::{Deserialize, Serialize};

/// Default number of results requested per page.
pub const DEFAULT_PAGE_SIZE: usize = 40;

/// Parameters that fully determine one page request.
///
/// Two equal requests always produce the same request URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Search query term, forwarded as-is (an empty query is permitted).
    pub query: String,

    /// Offset of the first result in this page.
    pub start_index: usize,

    /// Maximum number of results in this page. Always positive.
    pub page_size: usize,
}

impl PageRequest {
    /// Create a new page request with the default page size.
    pub fn new(query: impl Into<String>, start_index: usize) -> Self {
        Self {
            query: query.into(),
            start_index,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Set the page size.
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }
}
