//! Custom reasoning provider integration tests
//!
//! Swaps the local model for an in-process provider and checks that the
//! pipeline injects whatever it produces.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use thinkrelay::{AppError, AppResult, ChatRequest, ReasoningProvider, ThoughtFragment};

use crate::common::TestHarness;
use crate::mocks::MockUpstream;

/// Provider returning a canned model output
struct CannedReasoner {
    output: &'static str,
    calls: AtomicUsize,
}

impl CannedReasoner {
    fn new(output: &'static str) -> Arc<Self> {
        Arc::new(Self {
            output,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ReasoningProvider for CannedReasoner {
    fn name(&self) -> &'static str {
        "canned"
    }

    async fn think(&self, _request: &ChatRequest) -> AppResult<ThoughtFragment> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ThoughtFragment::extract(self.output))
    }
}

/// Provider that always fails with a fixed status
struct FailingReasoner;

#[async_trait]
impl ReasoningProvider for FailingReasoner {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn think(&self, _request: &ChatRequest) -> AppResult<ThoughtFragment> {
        Err(AppError::local_model(Some(503), "warming up"))
    }
}

fn request() -> Value {
    json!({"messages": [{"role": "user", "content": "add a test"}]})
}

#[tokio::test]
async fn test_custom_reasoner_fragment_is_injected() {
    let reasoner = CannedReasoner::new("<think>  cover the edge case ");
    let harness = TestHarness::with_reasoner(reasoner.clone()).await;
    harness.local.expect_no_calls().await;
    harness
        .upstream
        .mock_completion(MockUpstream::completion_body("ok"))
        .await;

    harness.chat(&request()).await.assert_status_ok();

    assert_eq!(reasoner.calls.load(Ordering::SeqCst), 1);
    let bodies = harness.upstream.received_bodies().await;
    assert_eq!(
        bodies[0]["messages"][1],
        json!({"role": "assistant", "content": "cover the edge case</think>"})
    );
}

#[tokio::test]
async fn test_custom_reasoner_not_called_without_credential() {
    let reasoner = CannedReasoner::new("<think>never");
    let harness = TestHarness::with_reasoner(reasoner.clone()).await;
    harness.upstream.expect_no_calls().await;

    let response = harness.chat_without_auth(&request()).await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(reasoner.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_reasoner_failure_aborts_request() {
    let harness = TestHarness::with_reasoner(Arc::new(FailingReasoner)).await;
    harness.upstream.expect_no_calls().await;

    let response = harness.chat(&request()).await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        response.json::<Value>(),
        json!({"error": "Local model error: warming up"})
    );
}
