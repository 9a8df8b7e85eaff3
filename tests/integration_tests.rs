//! Integration tests for bookscout
//!
//! These tests drive the paging controller end-to-end over the mock search
//! client and verify the state machine's observable behavior.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bookscout::client::mock::{make_page, MockSearchClient};
use bookscout::client::SearchError;
use bookscout::controller::{ControllerState, PagedResultController, SearchEvent};

/// A mock that serves fixed-size pages until `total` items are spent, then
/// an empty page.
fn finite_catalog(total: usize, page_size: usize) -> MockSearchClient {
    MockSearchClient::respond_with(move |request| {
        let remaining = total.saturating_sub(request.start_index);
        Ok(make_page(
            &format!("p{}", request.start_index),
            remaining.min(page_size),
        ))
    })
}

#[tokio::test]
async fn test_first_page_then_exhausted() {
    let client = Arc::new(finite_catalog(10, 40));
    let mut controller = PagedResultController::new(client.clone());

    controller.submit_query("android");
    let event = controller.next_event().await;
    match event {
        SearchEvent::PageLoaded(items) => assert_eq!(items.len(), 10),
        other => panic!("expected PageLoaded, got {other:?}"),
    }
    assert_eq!(controller.state(), ControllerState::AwaitingScroll);

    controller.request_more();
    assert_eq!(controller.next_event().await, SearchEvent::Exhausted);
    assert_eq!(controller.state(), ControllerState::Idle);
    assert!(controller.is_exhausted());
}

#[tokio::test]
async fn test_accumulation_matches_page_concatenation() {
    // 100 items in pages of 40: 40 + 40 + 20, then empty.
    let client = Arc::new(finite_catalog(100, 40));
    let mut controller = PagedResultController::new(client.clone());

    controller.submit_query("rust");
    let mut pages = Vec::new();
    loop {
        match controller.next_event().await {
            SearchEvent::PageLoaded(items) => {
                pages.push(items);
                controller.request_more();
            }
            SearchEvent::Exhausted => break,
            SearchEvent::Error(err) => panic!("unexpected error: {err}"),
        }
    }

    assert_eq!(pages.iter().map(Vec::len).collect::<Vec<_>>(), [40, 40, 20]);
    let concatenated: Vec<_> = pages.into_iter().flatten().collect();
    assert_eq!(controller.results(), concatenated.as_slice());

    // Requests walked the catalog in page-sized steps.
    let starts: Vec<_> = client.requests().iter().map(|r| r.start_index).collect();
    assert_eq!(starts, [0, 40, 80, 100]);
}

#[tokio::test]
async fn test_request_more_is_idempotent_under_rapid_repeat() {
    let client = Arc::new(finite_catalog(80, 40));
    let mut controller = PagedResultController::new(client.clone());

    controller.submit_query("android");
    assert!(matches!(
        controller.next_event().await,
        SearchEvent::PageLoaded(_)
    ));

    // Two continuation signals without an intervening completion.
    controller.request_more();
    controller.request_more();

    assert!(matches!(
        controller.next_event().await,
        SearchEvent::PageLoaded(_)
    ));
    assert_eq!(client.request_count(), 2);
    assert_eq!(controller.try_next_event(), None);
    assert_eq!(controller.results().len(), 80);
}

#[tokio::test]
async fn test_stale_completion_does_not_affect_new_session() {
    let (mock, gate) = MockSearchClient::respond_with(|request| {
        if request.start_index > 0 {
            return Ok(Vec::new());
        }
        match request.query.as_str() {
            "first" => Ok(make_page("first", 2)),
            "second" => Ok(make_page("second", 3)),
            other => panic!("unexpected query {other}"),
        }
    })
    .gated();
    let client = Arc::new(mock);
    let mut controller = PagedResultController::new(client.clone());

    // The second query supersedes the first while its fetch is still held.
    controller.submit_query("first");
    controller.submit_query("second");
    gate.add_permits(2);

    let event = controller.next_event().await;
    match event {
        SearchEvent::PageLoaded(items) => {
            assert_eq!(items.len(), 3);
            assert!(items.iter().all(|b| b.title.starts_with("second")));
        }
        other => panic!("expected PageLoaded, got {other:?}"),
    }
    assert_eq!(controller.query(), Some("second"));
    assert_eq!(controller.results().len(), 3);

    // Give the superseded fetch time to land, then confirm it was dropped.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(controller.try_next_event(), None);
    assert_eq!(controller.results().len(), 3);
    assert_eq!(controller.state(), ControllerState::AwaitingScroll);
}

#[tokio::test]
async fn test_error_leaves_session_resumable() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let attempts_in_handler = Arc::clone(&attempts);
    let client = Arc::new(MockSearchClient::respond_with(move |request| {
        if attempts_in_handler.fetch_add(1, Ordering::SeqCst) == 0 {
            Err(SearchError::Transport("timeout".to_string()))
        } else {
            assert_eq!(request.start_index, 0, "retry must reuse the failed start");
            Ok(make_page("retry", 5))
        }
    }));
    let mut controller = PagedResultController::new(client.clone());

    controller.submit_query("xyz");
    let event = controller.next_event().await;
    assert_eq!(
        event,
        SearchEvent::Error(SearchError::Transport("timeout".to_string()))
    );
    assert_eq!(controller.state(), ControllerState::Idle);
    assert!(!controller.is_exhausted());

    // The failed page is no longer in flight, so a continuation signal
    // retries the same start index.
    controller.request_more();
    match controller.next_event().await {
        SearchEvent::PageLoaded(items) => assert_eq!(items.len(), 5),
        other => panic!("expected PageLoaded, got {other:?}"),
    }
    assert_eq!(client.request_count(), 2);
    assert_eq!(controller.results().len(), 5);
}

#[tokio::test]
async fn test_only_empty_page_sets_exhausted() {
    let client = Arc::new(MockSearchClient::respond_with(|_| {
        Err(SearchError::Network("status 500".to_string()))
    }));
    let mut controller = PagedResultController::new(client.clone());

    controller.submit_query("android");
    assert!(matches!(controller.next_event().await, SearchEvent::Error(_)));
    assert!(!controller.is_exhausted());

    let client = Arc::new(MockSearchClient::new());
    let mut controller = PagedResultController::new(client.clone());
    controller.submit_query("android");
    assert_eq!(controller.next_event().await, SearchEvent::Exhausted);
    assert!(controller.is_exhausted());
}

#[tokio::test]
async fn test_empty_query_is_forwarded_as_is() {
    let client = Arc::new(MockSearchClient::new());
    let mut controller = PagedResultController::new(client.clone());

    controller.submit_query("");
    controller.next_event().await;

    let requests = client.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].query, "");
    assert_eq!(requests[0].start_index, 0);
}

#[tokio::test]
async fn test_new_query_resets_accumulated_results() {
    let client = Arc::new(finite_catalog(5, 40));
    let mut controller = PagedResultController::new(client.clone());

    controller.submit_query("keep");
    assert!(matches!(
        controller.next_event().await,
        SearchEvent::PageLoaded(_)
    ));
    assert_eq!(controller.results().len(), 5);

    controller.submit_query("fresh");
    assert!(controller.results().is_empty());
    assert_eq!(controller.state(), ControllerState::Loading);
    assert_eq!(controller.query(), Some("fresh"));
}

#[tokio::test]
async fn test_page_size_flows_into_requests() {
    let client = Arc::new(finite_catalog(30, 10));
    let mut controller = PagedResultController::new(client.clone()).with_page_size(10);

    controller.submit_query("android");
    match controller.next_event().await {
        SearchEvent::PageLoaded(items) => assert_eq!(items.len(), 10),
        other => panic!("expected PageLoaded, got {other:?}"),
    }

    let requests = client.requests();
    assert_eq!(requests[0].page_size, 10);
}
