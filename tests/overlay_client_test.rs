//! Overlay Persistence Client Tests
//!
//! create / update / restore / delete against a mocked `/overlay/{user}`.

use mockito::{Matcher, Server};
use serde_json::{json, Value};

use livesitter::api::{ApiError, OverlayClient};
use livesitter::models::{OverlayRecord, OverlaySet, Point, DEFAULT_FONT_SIZE};

fn default_elements() -> Value {
    json!([
        {
            "type": "Text",
            "context": "Live",
            "position": { "x": 100.0, "y": 50.0 },
            "fontSize": 22.0,
            "opacity": 0.8
        },
        {
            "type": "Logo",
            "content": "",
            "position": { "x": 10.0, "y": 10.0 },
            "size": { "width": 100.0, "height": 100.0 },
            "opacity": 0.8
        }
    ])
}

// =============================================================================
// Create / Update
// =============================================================================

/// Create posts the stream URLs with both elements
#[tokio::test]
async fn test_create_posts_record() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("POST", "/overlay/alice")
        .match_body(Matcher::Json(json!({
            "rtsp_url": "rtsp://example.com/cam1",
            "hls_url": "http://localhost:5001/hls/cam1.m3u8",
            "element": default_elements(),
        })))
        .with_status(201)
        .with_body(r#"{"message": "created"}"#)
        .create_async()
        .await;

    let client = OverlayClient::with_base_url(server.url());
    let record = OverlayRecord {
        rtsp_url: "rtsp://example.com/cam1".into(),
        hls_url: "http://localhost:5001/hls/cam1.m3u8".into(),
        overlays: OverlaySet::default(),
    };
    client.create("alice", &record).await.unwrap();

    mock.assert_async().await;
}

/// Update puts only the elements
#[tokio::test]
async fn test_update_puts_elements() {
    let mut server = Server::new_async().await;

    let mut overlays = OverlaySet::default();
    overlays.caption.set_position(Point::new(300.0, 120.0));

    let mut expected = default_elements();
    expected[0]["position"] = json!({ "x": 300.0, "y": 120.0 });

    let mock = server
        .mock("PUT", "/overlay/alice")
        .match_body(Matcher::Json(json!({ "element": expected })))
        .with_status(200)
        .create_async()
        .await;

    let client = OverlayClient::with_base_url(server.url());
    client.update("alice", &overlays).await.unwrap();

    mock.assert_async().await;
}

/// Users are percent-encoded into the path
#[tokio::test]
async fn test_user_is_percent_encoded() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("PUT", "/overlay/bob%20smith")
        .with_status(200)
        .create_async()
        .await;

    let client = OverlayClient::with_base_url(server.url());
    client.update("bob smith", &OverlaySet::default()).await.unwrap();

    mock.assert_async().await;
}

/// Server errors surface as status errors
#[tokio::test]
async fn test_update_server_error() {
    let mut server = Server::new_async().await;

    let _mock = server
        .mock("PUT", "/overlay/alice")
        .with_status(500)
        .create_async()
        .await;

    let client = OverlayClient::with_base_url(server.url());
    let result = client.update("alice", &OverlaySet::default()).await;

    match result {
        Err(ApiError::Status(status)) => assert_eq!(status.as_u16(), 500),
        other => panic!("expected status error, got {:?}", other),
    }
}

// =============================================================================
// Restore
// =============================================================================

/// Stored Text element without fontSize restores at the default size
#[tokio::test]
async fn test_restore_defaults_font_size() {
    let mut server = Server::new_async().await;

    let _mock = server
        .mock("GET", "/overlay/bob")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "username": "bob",
                "rtsp_url": "rtsp://cam",
                "hls_url": "/streams/stream.m3u8",
                "element": [
                    { "type": "Text", "context": "Bob's cam", "position": { "x": 12, "y": 34 },
                      "size": { "width": 200, "height": 50 }, "opacity": 1 },
                    { "type": "Logo", "content": "https://x/logo.png", "position": { "x": 5, "y": 6 },
                      "size": { "width": 64, "height": 32 }, "opacity": 0.4 }
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = OverlayClient::with_base_url(server.url());
    let overlays = client.restore("bob").await.unwrap();

    assert_eq!(overlays.caption.text, "Bob's cam");
    assert_eq!(overlays.caption.position(), Point::new(12.0, 34.0));
    assert_eq!(overlays.caption.font_size, DEFAULT_FONT_SIZE);
    assert_eq!(overlays.caption.opacity, 1.0);
    assert_eq!(overlays.logo.image_url, "https://x/logo.png");
    assert_eq!((overlays.logo.width, overlays.logo.height), (64.0, 32.0));
    assert_eq!(overlays.logo.opacity, 0.4);
}

/// Saved model comes back unchanged
#[tokio::test]
async fn test_update_then_restore_roundtrip() {
    let mut server = Server::new_async().await;

    let mut overlays = OverlaySet::default();
    overlays.caption.text = "On Air".into();
    overlays.caption.font_size = 30.0;
    overlays.logo.image_url = "https://x/l.png".into();
    overlays.logo.set_position(Point::new(420.0, 8.0));

    let stored = json!({ "element": overlays.to_elements() });

    let put = server
        .mock("PUT", "/overlay/carol")
        .match_body(Matcher::Json(stored.clone()))
        .with_status(200)
        .create_async()
        .await;
    let get = server
        .mock("GET", "/overlay/carol")
        .with_status(200)
        .with_body(stored.to_string())
        .create_async()
        .await;

    let client = OverlayClient::with_base_url(server.url());
    client.update("carol", &overlays).await.unwrap();
    let restored = client.restore("carol").await.unwrap();

    assert_eq!(restored, overlays);
    put.assert_async().await;
    get.assert_async().await;
}

/// A single stored element is malformed
#[tokio::test]
async fn test_restore_single_element_is_malformed() {
    let mut server = Server::new_async().await;

    let _mock = server
        .mock("GET", "/overlay/dave")
        .with_status(200)
        .with_body(json!({ "element": [default_elements()[0].clone()] }).to_string())
        .create_async()
        .await;

    let client = OverlayClient::with_base_url(server.url());
    match client.restore("dave").await {
        Err(ApiError::Malformed(e)) => assert_eq!(e.found, 1),
        other => panic!("expected malformed record, got {:?}", other),
    }
}

/// Three stored elements are malformed
#[tokio::test]
async fn test_restore_three_elements_is_malformed() {
    let mut server = Server::new_async().await;

    let elements = default_elements();
    let three = json!([elements[0].clone(), elements[1].clone(), elements[0].clone()]);
    let _mock = server
        .mock("GET", "/overlay/erin")
        .with_status(200)
        .with_body(json!({ "element": three }).to_string())
        .create_async()
        .await;

    let client = OverlayClient::with_base_url(server.url());
    match client.restore("erin").await {
        Err(ApiError::Malformed(e)) => assert_eq!(e.found, 3),
        other => panic!("expected malformed record, got {:?}", other),
    }
}

/// A record without elements is malformed, not a parse error
#[tokio::test]
async fn test_restore_without_elements_is_malformed() {
    let mut server = Server::new_async().await;

    let _mock = server
        .mock("GET", "/overlay/frank")
        .with_status(200)
        .with_body(r#"{"username": "frank", "rtsp_url": "rtsp://cam"}"#)
        .create_async()
        .await;

    let client = OverlayClient::with_base_url(server.url());
    assert!(matches!(
        client.restore("frank").await,
        Err(ApiError::Malformed(_))
    ));
}

/// An element of an unknown type is malformed, not a parse error
#[tokio::test]
async fn test_restore_unknown_element_type_is_malformed() {
    let mut server = Server::new_async().await;

    let elements = default_elements();
    let stored = json!({
        "element": [elements[0].clone(), { "type": "Sticker", "content": "x" }]
    });
    let _mock = server
        .mock("GET", "/overlay/gina")
        .with_status(200)
        .with_body(stored.to_string())
        .create_async()
        .await;

    let client = OverlayClient::with_base_url(server.url());
    match client.restore("gina").await {
        Err(ApiError::Malformed(e)) => assert_eq!(e.found, 2),
        other => panic!("expected malformed record, got {:?}", other),
    }
}

/// Unknown user is a 404
#[tokio::test]
async fn test_restore_unknown_user() {
    let mut server = Server::new_async().await;

    let _mock = server
        .mock("GET", "/overlay/nobody")
        .with_status(404)
        .with_body(r#"{"error": "not found"}"#)
        .create_async()
        .await;

    let client = OverlayClient::with_base_url(server.url());
    let err = client.restore("nobody").await.unwrap_err();
    assert!(err.is_not_found());
}

// =============================================================================
// Delete
// =============================================================================

#[tokio::test]
async fn test_delete() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("DELETE", "/overlay/alice")
        .with_status(200)
        .create_async()
        .await;

    let client = OverlayClient::with_base_url(server.url());
    client.delete("alice").await.unwrap();

    mock.assert_async().await;
}
