//! Book summary model produced by a volumes search.

use serde::{Deserialize, Serialize};
use url::Url;

/// A single book returned by a volumes search.
///
/// Summaries are produced only by parsing a response item and are never
/// mutated afterwards. They carry no identity beyond structural equality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookSummary {
    /// Book title.
    pub title: String,

    /// Authors in the order the API lists them. May be empty.
    pub authors: Vec<String>,

    /// Link to the book's detail page. May be empty or not a valid URL.
    pub detail_url: String,
}

impl BookSummary {
    /// Create a new book summary.
    pub fn new(
        title: impl Into<String>,
        authors: Vec<String>,
        detail_url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            authors,
            detail_url: detail_url.into(),
        }
    }

    /// Authors joined with ", " for display.
    pub fn authors_joined(&self) -> String {
        self.authors.join(", ")
    }

    /// Whether the detail URL is an absolute http(s) URL worth following.
    pub fn has_valid_detail_url(&self) -> bool {
        match Url::parse(&self.detail_url) {
            Ok(url) => matches!(url.scheme(), "http" | "https"),
            Err(_) => false,
        }
    }
}
