use std::sync::Arc;
use std::time::Duration;

use feed_engine::{
    EngineEvent, EngineHandle, FailureKind, FeedClient, FeedRequest, FeedResponse, FeedSettings,
    FetchError, FetchMetadata, FetchOutput, Fetcher, LinkTransformer, SubredditQuery,
    TrackingListConfig, TrackingParams, TrackingStatus,
};
use tempfile::TempDir;

const WAIT: Duration = Duration::from_secs(5);

const TRACKING_LIST: &str = "$removeparam=utm_source\n$removeparam=gclid\n";

/// Answers instantly except for `/r/slow`, which never completes.
struct StubFetcher;

#[async_trait::async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchOutput, FetchError> {
        if url.contains("/r/slow") {
            std::future::pending::<()>().await;
        }
        if url.contains("/r/gone") {
            return Err(FetchError::new(FailureKind::HttpStatus(404), "not found"));
        }
        if url.ends_with("/lists/missing.txt") {
            return Err(FetchError::new(FailureKind::HttpStatus(503), "unavailable"));
        }
        let body = if url.ends_with("/lists/tracking.txt") {
            TRACKING_LIST
        } else {
            LISTING
        };
        Ok(FetchOutput {
            bytes: body.as_bytes().to_vec(),
            metadata: FetchMetadata {
                original_url: url.to_string(),
                final_url: url.to_string(),
                redirect_count: 0,
                content_type: Some("text/html".to_string()),
                byte_len: body.len() as u64,
            },
        })
    }
}

const LISTING: &str = r#"<div class="thing link" data-fullname="t3_x" data-subreddit="rust"
            data-url="https://example.org" data-permalink="/r/rust/comments/x/y/">
            <a class="title" href="https://example.org">X</a></div>"#;

fn client() -> FeedClient {
    FeedClient::new(
        FeedSettings::default(),
        Arc::new(StubFetcher),
        LinkTransformer::default(),
    )
    .unwrap()
}

fn engine() -> EngineHandle {
    feed_logging::initialize_for_tests();
    let tracking = Arc::new(TrackingParams::preloaded(vec!["utm_source".to_string()]));
    EngineHandle::new(client(), tracking).unwrap()
}

/// An engine whose tracking list downloads from `/lists/<file>` through the stub.
fn engine_with_tracking_source(file: &str, dir: &TempDir) -> (EngineHandle, Arc<TrackingParams>) {
    feed_logging::initialize_for_tests();
    let config = TrackingListConfig {
        source_url: format!("https://lists.example.org/lists/{file}"),
        cache_path: dir.path().join("tracking.txt"),
    };
    let tracking = Arc::new(TrackingParams::new(config, Arc::new(StubFetcher)));
    let engine = EngineHandle::new(client(), tracking.clone()).unwrap();
    (engine, tracking)
}

fn subreddit(name: &str) -> FeedRequest {
    FeedRequest::Subreddit {
        query: SubredditQuery::new(name),
        after: None,
    }
}

#[test]
fn completed_requests_report_their_id() {
    let engine = engine();
    engine.enqueue(7, subreddit("rust"));

    match engine.recv_timeout(WAIT) {
        Some(EngineEvent::Completed {
            request_id,
            result: Ok(FeedResponse::Posts(page)),
        }) => {
            assert_eq!(request_id, 7);
            assert_eq!(page.items.len(), 1);
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn failures_arrive_as_completed_errors() {
    let engine = engine();
    engine.enqueue(3, subreddit("gone"));

    match engine.recv_timeout(WAIT) {
        Some(EngineEvent::Completed {
            request_id: 3,
            result: Err(err),
        }) => assert_eq!(err.kind, FailureKind::HttpStatus(404)),
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn cancel_stops_one_request_only() {
    let engine = engine();
    engine.enqueue(1, subreddit("slow"));
    assert!(engine.cancel(1));
    engine.enqueue(2, subreddit("rust"));

    let mut events = vec![
        engine.recv_timeout(WAIT).expect("first event"),
        engine.recv_timeout(WAIT).expect("second event"),
    ];
    events.sort_by_key(|event| match event {
        EngineEvent::Completed { request_id, .. } | EngineEvent::Cancelled { request_id } => {
            *request_id
        }
        EngineEvent::TrackingListUpdated(_) => 0,
    });
    assert_eq!(events[0], EngineEvent::Cancelled { request_id: 1 });
    assert!(matches!(
        events[1],
        EngineEvent::Completed {
            request_id: 2,
            result: Ok(_)
        }
    ));
    assert!(!engine.cancel(1));
}

#[test]
fn unknown_requests_cannot_be_cancelled() {
    let engine = engine();
    assert!(!engine.cancel(42));
    assert!(engine.try_recv().is_none());
}

#[test]
fn tracking_list_update_reports_the_count() {
    let dir = TempDir::new().unwrap();
    let (engine, tracking) = engine_with_tracking_source("tracking.txt", &dir);
    engine.update_tracking_list();

    match engine.recv_timeout(WAIT) {
        Some(EngineEvent::TrackingListUpdated(Ok(count))) => assert_eq!(count, 2),
        other => panic!("unexpected event: {other:?}"),
    }
    assert_eq!(tracking.status(), TrackingStatus::Loaded(2));
    assert!(dir.path().join("tracking.txt").exists());
}

#[test]
fn tracking_list_update_failure_is_reported() {
    let dir = TempDir::new().unwrap();
    let (engine, tracking) = engine_with_tracking_source("missing.txt", &dir);
    engine.update_tracking_list();

    match engine.recv_timeout(WAIT) {
        Some(EngineEvent::TrackingListUpdated(Err(message))) => {
            assert!(message.contains("download failed"), "{message}")
        }
        other => panic!("unexpected event: {other:?}"),
    }
    assert_eq!(tracking.status(), TrackingStatus::Unloaded);
    assert!(!dir.path().join("tracking.txt").exists());
}
