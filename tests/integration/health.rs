//! Health and metrics endpoint integration tests

use serde_json::Value;

use crate::common::{constants, TestHarness};

#[tokio::test]
async fn test_health_reports_configured_models() {
    let harness = TestHarness::new().await;

    let response = harness.server.get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["local_model"], constants::TEST_LOCAL_MODEL);
    assert_eq!(body["upstream_model"], constants::TEST_UPSTREAM_MODEL);
    assert!(body["uptime_seconds"].is_u64());
}

#[tokio::test]
async fn test_metrics_endpoint_responds() {
    let harness = TestHarness::new().await;

    harness.server.get("/metrics").await.assert_status_ok();
}
