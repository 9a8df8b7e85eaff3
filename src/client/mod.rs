//! Search client trait and error taxonomy.
//!
//! The [`SearchClient`] trait is the seam between the paging controller and
//! the network. The production implementation is [`VolumesClient`]; tests
//! drive the controller through [`mock::MockSearchClient`] instead.

pub mod mock;
mod volumes;

pub use mock::MockSearchClient;
pub use volumes::VolumesClient;

use async_trait::async_trait;

use crate::models::{BookSummary, PageRequest};

/// Outcome of one page fetch. An `Ok` with no items signals exhaustion.
pub type PageResult = Result<Vec<BookSummary>, SearchError>;

/// A client that can fetch one page of search results.
///
/// Implementations may be invoked concurrently for distinct requests and
/// must never panic on malformed input; every failure path terminates in a
/// tagged [`SearchError`].
#[async_trait]
pub trait SearchClient: Send + Sync + std::fmt::Debug {
    /// Fetch the page of results described by `request`.
    async fn fetch_page(&self, request: &PageRequest) -> PageResult;
}

/// Errors that can occur while fetching a page
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// Transport failure before a response arrived (DNS, timeout, reset)
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status
    #[error("network error: {0}")]
    Network(String),

    /// The response payload was not the expected JSON shape
    #[error("parse error: {0}")]
    Parse(String),
}

impl SearchError {
    /// Short identifier for the error class, stable for display and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            SearchError::Transport(_) => "transport",
            SearchError::Network(_) => "network",
            SearchError::Parse(_) => "parse",
        }
    }
}
