//! Streaming relay integration tests
//!
//! Tests for `stream: true` requests:
//! - Event-stream headers on the relayed response
//! - Upstream bytes relayed unchanged and in order
//! - Errors before the stream starts still produce JSON

use axum::http::{header, StatusCode};
use serde_json::{json, Value};

use crate::common::TestHarness;
use crate::mocks::MockUpstream;

fn streaming_request() -> Value {
    json!({
        "model": "claude-sonnet",
        "stream": true,
        "messages": [{"role": "user", "content": "Write a haiku about borrowck"}]
    })
}

#[tokio::test]
async fn test_stream_is_relayed_verbatim() {
    let harness = TestHarness::new().await;
    harness.local.mock_reasoning(&["<think>five seven five"]).await;
    let sse = MockUpstream::sse_body(&["Lifetimes ", "entwine, ", "moves ", "denied"]);
    harness.upstream.mock_stream(sse.clone()).await;

    let response = harness.chat(&streaming_request()).await;

    response.assert_status_ok();
    assert_eq!(
        response.header(header::CONTENT_TYPE),
        "text/event-stream"
    );
    assert_eq!(response.header(header::CACHE_CONTROL), "no-cache");

    let relayed = response.text().replace(": heartbeat\n\n", "");
    assert_eq!(relayed, sse);

    let bodies = harness.upstream.received_bodies().await;
    assert_eq!(bodies[0]["stream"], true);
    assert_eq!(
        bodies[0]["messages"][1],
        json!({"role": "assistant", "content": "five seven five</think>"})
    );
}

#[tokio::test]
async fn test_non_streaming_never_returns_event_stream() {
    let harness = TestHarness::new().await;
    harness.local.mock_reasoning(&["no tags here"]).await;
    harness
        .upstream
        .mock_completion(MockUpstream::completion_body("plain"))
        .await;

    let mut request = streaming_request();
    request["stream"] = json!(false);

    let response = harness.chat(&request).await;

    response.assert_status_ok();
    let content_type = response.header(header::CONTENT_TYPE);
    assert_ne!(content_type, "text/event-stream");
    assert_eq!(response.json::<Value>()["choices"][0]["message"]["content"], "plain");
}

#[tokio::test]
async fn test_upstream_failure_before_stream_is_json_error() {
    let harness = TestHarness::new().await;
    harness.local.mock_reasoning(&["<think>x"]).await;
    harness.upstream.mock_error(503, "overloaded").await;

    let response = harness.chat(&streaming_request()).await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        response.header(header::CONTENT_TYPE),
        "application/json"
    );
    assert!(response.json::<Value>()["error"]
        .as_str()
        .unwrap()
        .contains("overloaded"));
}
