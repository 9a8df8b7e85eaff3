//! Mock search client for testing purposes.

use std::fmt;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::client::{PageResult, SearchClient};
use crate::models::{BookSummary, PageRequest};

type Handler = Box<dyn Fn(&PageRequest) -> PageResult + Send + Sync>;

/// A mock client that computes scripted responses from the incoming request.
///
/// Keying responses on the request keeps concurrent completions
/// deterministic. An optional gate holds every fetch until the test releases
/// a permit, so completion timing can be controlled precisely.
pub struct MockSearchClient {
    handler: Handler,
    requests: Mutex<Vec<PageRequest>>,
    gate: Option<Arc<Semaphore>>,
}

impl MockSearchClient {
    /// Create a mock that answers every request with an empty page.
    pub fn new() -> Self {
        Self::respond_with(|_| Ok(Vec::new()))
    }

    /// Create a mock whose responses are computed from the request.
    pub fn respond_with<F>(handler: F) -> Self
    where
        F: Fn(&PageRequest) -> PageResult + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Hold every fetch until a permit is added to the returned semaphore.
    pub fn gated(mut self) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        self.gate = Some(Arc::clone(&gate));
        (self, gate)
    }

    /// Requests observed so far, in arrival order.
    pub fn requests(&self) -> Vec<PageRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of fetches issued against this mock.
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Default for MockSearchClient {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MockSearchClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockSearchClient")
            .field("request_count", &self.request_count())
            .field("gated", &self.gate.is_some())
            .finish()
    }
}

#[async_trait]
impl SearchClient for MockSearchClient {
    async fn fetch_page(&self, request: &PageRequest) -> PageResult {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(gate) = &self.gate {
            let permit = gate.acquire().await.expect("mock gate closed");
            permit.forget();
        }
        (self.handler)(request)
    }
}

/// Helper function to create a book summary for testing.
pub fn make_book(title: &str) -> BookSummary {
    BookSummary::new(
        title,
        vec!["Test Author".to_string()],
        format!("https://books.example.com/{title}"),
    )
}

/// Helper function to create a page of `count` numbered books for testing.
pub fn make_page(prefix: &str, count: usize) -> Vec<BookSummary> {
    (0..count)
        .map(|i| make_book(&format!("{prefix}-{i}")))
        .collect()
}
