use feed_engine::{fetch_html, FailureKind, FetchSettings, Fetcher, ReqwestFetcher};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn fetcher_returns_body_and_metadata() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/r/rust"))
        .and(header("accept", "text/html"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<html>ok</html>", "text/html; charset=utf-8"),
        )
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings::default());
    let url = format!("{}/r/rust", server.uri());

    let output = fetcher.fetch(&url).await.expect("fetch ok");
    assert_eq!(output.metadata.original_url, url);
    assert_eq!(output.metadata.redirect_count, 0);
    assert_eq!(output.metadata.byte_len, 15);
    assert!(output
        .metadata
        .content_type
        .unwrap()
        .starts_with("text/html"));
    assert_eq!(output.bytes, b"<html>ok</html>");
}

#[tokio::test]
async fn non_success_status_is_reported_with_its_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::default();
    let err = fetch_html(&fetcher, &format!("{}/missing", server.uri()))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(404));
}

#[tokio::test]
async fn empty_body_is_no_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/empty"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::default();
    let err = fetch_html(&fetcher, &format!("{}/empty", server.uri()))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::NoData);
}

#[tokio::test]
async fn undecodable_body_is_a_decode_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/binary"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![0x80, 0x81, 0xfe], "text/html"))
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::default();
    let err = fetch_html(&fetcher, &format!("{}/binary", server.uri()))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::DecodeFailure);
}

#[tokio::test]
async fn declared_charset_is_honoured() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/latin"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(b"caf\xe9".to_vec(), "text/html; charset=ISO-8859-1"),
        )
        .mount(&server)
        .await;

    let html = fetch_html(&ReqwestFetcher::default(), &format!("{}/latin", server.uri()))
        .await
        .unwrap();
    assert_eq!(html, "café");
}

#[tokio::test]
async fn malformed_locator_is_invalid_url() {
    let err = ReqwestFetcher::default()
        .fetch("not a url")
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}

#[tokio::test]
async fn unreachable_host_is_a_transport_failure() {
    // port 9 (discard) on localhost is not expected to accept connections
    let err = ReqwestFetcher::default()
        .fetch("http://127.0.0.1:9/")
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Transport);
}
