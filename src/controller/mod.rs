//! Paging state machine that sequences page fetches for one query at a time.
//!
//! [`PagedResultController`] owns the continuation state of the current
//! search: which query is live, where the next page starts, whether the
//! result set is exhausted, and which start index is in flight. Consumers
//! drive it with [`submit_query`](PagedResultController::submit_query) and
//! [`request_more`](PagedResultController::request_more) and drain
//! [`SearchEvent`]s from [`next_event`](PagedResultController::next_event).
//!
//! Fetches run as spawned tasks; their completions come back over an
//! internal channel and are processed on the single event-draining path, so
//! the session needs no locking. A completion from a superseded session is
//! discarded by an identity check rather than cancelled.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use crate::client::{SearchClient, SearchError};
use crate::models::{BookSummary, PageRequest, DEFAULT_PAGE_SIZE};

/// Consumer-facing event emitted for each processed page completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
    /// A non-empty page arrived and was appended to the accumulated results.
    PageLoaded(Vec<BookSummary>),
    /// An empty page arrived; the current query has no further results.
    Exhausted,
    /// The page fetch failed. The session stays resumable via
    /// [`request_more`](PagedResultController::request_more).
    Error(SearchError),
}

/// Observable controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// No fetch in flight. Either nothing was ever submitted, the current
    /// query is exhausted, or the last fetch failed.
    Idle,
    /// A page fetch is in flight for the current session.
    Loading,
    /// The last page arrived; waiting for a continuation signal.
    AwaitingScroll,
}

/// Continuation state for one submitted query.
///
/// Superseded whenever a new query is submitted; completions carrying an
/// older session id are ignored on arrival.
#[derive(Debug)]
struct SearchSession {
    id: u64,
    query: String,
    next_start_index: usize,
    exhausted: bool,
    in_flight: HashSet<usize>,
}

impl SearchSession {
    fn new(id: u64, query: String) -> Self {
        Self {
            id,
            query,
            next_start_index: 0,
            exhausted: false,
            in_flight: HashSet::new(),
        }
    }
}

/// Result of one fetch, tagged with the session it belongs to.
#[derive(Debug)]
struct Completion {
    session_id: u64,
    start_index: usize,
    result: Result<Vec<BookSummary>, SearchError>,
}

/// Sequences page fetches for the consumer, guaranteeing at most one
/// outstanding request per page and at most one fetch in flight per session.
pub struct PagedResultController {
    client: Arc<dyn SearchClient>,
    page_size: usize,
    state: ControllerState,
    session: Option<SearchSession>,
    next_session_id: u64,
    books: Vec<BookSummary>,
    completion_tx: mpsc::UnboundedSender<Completion>,
    completion_rx: mpsc::UnboundedReceiver<Completion>,
}

impl PagedResultController {
    /// Create a controller over the given client with the default page size.
    pub fn new(client: Arc<dyn SearchClient>) -> Self {
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        Self {
            client,
            page_size: DEFAULT_PAGE_SIZE,
            state: ControllerState::Idle,
            session: None,
            next_session_id: 0,
            books: Vec::new(),
            completion_tx,
            completion_rx,
        }
    }

    /// Set the page size used for every request.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Current controller state.
    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Query of the current session, if any.
    pub fn query(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.query.as_str())
    }

    /// Accumulated results of the current session, in arrival order.
    pub fn results(&self) -> &[BookSummary] {
        &self.books
    }

    /// Whether the current session has seen its empty terminal page.
    pub fn is_exhausted(&self) -> bool {
        self.session.as_ref().map(|s| s.exhausted).unwrap_or(false)
    }

    /// Submit a new query, superseding any previous session.
    ///
    /// The previous session's in-flight completions are not cancelled; they
    /// are discarded when they arrive. An empty query is forwarded as-is.
    pub fn submit_query(&mut self, query: impl Into<String>) {
        let query = query.into();
        self.next_session_id += 1;
        let mut session = SearchSession::new(self.next_session_id, query.clone());
        session.in_flight.insert(0);

        debug!(session = session.id, query = %query, "starting search session");
        self.books.clear();
        self.spawn_fetch(session.id, query, 0);
        self.session = Some(session);
        self.state = ControllerState::Loading;
    }

    /// Request the next page of the current session.
    ///
    /// No-op while a fetch is in flight, when the session is exhausted, when
    /// the next page is already requested, or when no session exists. This
    /// makes rapid repeated continuation signals idempotent. After an error
    /// the session stays live, so calling this retries the failed page.
    pub fn request_more(&mut self) {
        if self.state == ControllerState::Loading {
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.exhausted {
            return;
        }
        let start_index = session.next_start_index;
        if !session.in_flight.insert(start_index) {
            return;
        }

        let session_id = session.id;
        let query = session.query.clone();
        self.spawn_fetch(session_id, query, start_index);
        self.state = ControllerState::Loading;
    }

    /// Wait for the next consumer-facing event.
    ///
    /// Stale completions from superseded sessions are discarded here without
    /// producing an event. Awaiting with no fetch in flight does not resolve
    /// until a later command issues one.
    pub async fn next_event(&mut self) -> SearchEvent {
        loop {
            let completion = match self.completion_rx.recv().await {
                Some(completion) => completion,
                // The controller holds its own sender, so the channel
                // cannot close.
                None => unreachable!("completion channel closed"),
            };
            if let Some(event) = self.process_completion(completion) {
                return event;
            }
        }
    }

    /// Process any already-arrived completions without waiting.
    ///
    /// Returns `None` when no event is ready.
    pub fn try_next_event(&mut self) -> Option<SearchEvent> {
        while let Ok(completion) = self.completion_rx.try_recv() {
            if let Some(event) = self.process_completion(completion) {
                return Some(event);
            }
        }
        None
    }

    fn spawn_fetch(&self, session_id: u64, query: String, start_index: usize) {
        let client = Arc::clone(&self.client);
        let completion_tx = self.completion_tx.clone();
        let request = PageRequest::new(query, start_index).page_size(self.page_size);

        tokio::spawn(async move {
            let result = client.fetch_page(&request).await;
            // Send fails only when the controller is gone; nothing to do then.
            let _ = completion_tx.send(Completion {
                session_id,
                start_index,
                result,
            });
        });
    }

    fn process_completion(&mut self, completion: Completion) -> Option<SearchEvent> {
        let session = self.session.as_mut()?;
        if completion.session_id != session.id {
            debug!(
                stale_session = completion.session_id,
                current_session = session.id,
                start_index = completion.start_index,
                "discarding stale completion"
            );
            return None;
        }

        session.in_flight.remove(&completion.start_index);
        match completion.result {
            Ok(items) if items.is_empty() => {
                session.exhausted = true;
                self.state = ControllerState::Idle;
                Some(SearchEvent::Exhausted)
            }
            Ok(items) => {
                session.next_start_index += items.len();
                self.books.extend_from_slice(&items);
                self.state = ControllerState::AwaitingScroll;
                Some(SearchEvent::PageLoaded(items))
            }
            Err(err) => {
                self.state = ControllerState::Idle;
                Some(SearchEvent::Error(err))
            }
        }
    }
}

impl std::fmt::Debug for PagedResultController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PagedResultController")
            .field("state", &self.state)
            .field("session", &self.session)
            .field("results", &self.books.len())
            .finish()
    }
}
