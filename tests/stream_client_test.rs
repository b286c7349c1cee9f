//! Stream Session Client Tests
//!
//! start_stream against a mocked backend.

use mockito::{Matcher, Server};
use serde_json::json;

use livesitter::api::{ApiError, StreamClient};

// =============================================================================
// Endpoint Resolution
// =============================================================================

/// Relative manifest path is joined onto the backend base URL
#[tokio::test]
async fn test_start_stream_resolves_relative_path() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("POST", "/start_stream")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({ "rtsp_url": "rtsp://example.com/cam1" })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message": "Streaming started", "hls_url": "/hls/cam1.m3u8"}"#)
        .create_async()
        .await;

    let client = StreamClient::with_base_url(server.url());
    let endpoint = client.start_stream("rtsp://example.com/cam1").await.unwrap();

    assert_eq!(endpoint, format!("{}/hls/cam1.m3u8", server.url()));
    mock.assert_async().await;
}

/// Trailing slash on the base does not double up
#[tokio::test]
async fn test_start_stream_base_with_trailing_slash() {
    let mut server = Server::new_async().await;

    let _mock = server
        .mock("POST", "/start_stream")
        .with_status(200)
        .with_body(r#"{"hls_url": "/streams/stream.m3u8"}"#)
        .create_async()
        .await;

    let client = StreamClient::with_base_url(format!("{}/", server.url()));
    let endpoint = client.start_stream("rtsp://cam").await.unwrap();

    assert_eq!(endpoint, format!("{}/streams/stream.m3u8", server.url()));
}

/// Surrounding whitespace is stripped before sending
#[tokio::test]
async fn test_start_stream_trims_url() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("POST", "/start_stream")
        .match_body(Matcher::Json(json!({ "rtsp_url": "rtsp://cam/2" })))
        .with_status(200)
        .with_body(r#"{"hls_url": "/streams/stream.m3u8"}"#)
        .create_async()
        .await;

    let client = StreamClient::with_base_url(server.url());
    client.start_stream("  rtsp://cam/2 \n").await.unwrap();
    mock.assert_async().await;
}

// =============================================================================
// Failures
// =============================================================================

/// Empty URL never reaches the backend
#[tokio::test]
async fn test_empty_url_makes_no_request() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("POST", "/start_stream")
        .expect(0)
        .create_async()
        .await;

    let client = StreamClient::with_base_url(server.url());
    let result = client.start_stream("   ").await;

    assert!(matches!(result, Err(ApiError::EmptyUrl)));
    mock.assert_async().await;
}

/// 400 from the backend is a status error
#[tokio::test]
async fn test_backend_rejection_is_status_error() {
    let mut server = Server::new_async().await;

    let _mock = server
        .mock("POST", "/start_stream")
        .with_status(400)
        .with_body(r#"{"error": "No RTSP URL provided"}"#)
        .create_async()
        .await;

    let client = StreamClient::with_base_url(server.url());
    let result = client.start_stream("rtsp://cam").await;

    match result {
        Err(ApiError::Status(status)) => assert_eq!(status.as_u16(), 400),
        other => panic!("expected status error, got {:?}", other),
    }
}

/// 200 without an hls_url is a parse error
#[tokio::test]
async fn test_missing_hls_url_is_parse_error() {
    let mut server = Server::new_async().await;

    let _mock = server
        .mock("POST", "/start_stream")
        .with_status(200)
        .with_body(r#"{"message": "Streaming started"}"#)
        .create_async()
        .await;

    let client = StreamClient::with_base_url(server.url());
    let result = client.start_stream("rtsp://cam").await;

    assert!(matches!(result, Err(ApiError::Parse(_))));
}

/// Unreachable backend is a network error
#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    // Port 9 (discard) is almost never listening
    let client = StreamClient::with_base_url("http://127.0.0.1:9");
    let result = client.start_stream("rtsp://cam").await;

    assert!(matches!(result, Err(ApiError::Network(_))));
}
