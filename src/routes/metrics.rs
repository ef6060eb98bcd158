//! Prometheus metrics endpoint
//!
//! Exposes application metrics in Prometheus format for monitoring.

use axum::response::IntoResponse;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

/// Global Prometheus handle for metrics export
static PROMETHEUS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Initialize metrics (call once at startup)
pub fn init_metrics() -> anyhow::Result<()> {
    PROMETHEUS_HANDLE.get_or_try_init(|| PrometheusBuilder::new().install_recorder())?;

    register_metrics();
    Ok(())
}

/// Register all custom metrics
fn register_metrics() {
    metrics::describe_counter!(
        "thinkrelay_requests_total",
        "Total number of chat completion requests by response status"
    );
    metrics::describe_histogram!(
        "thinkrelay_request_duration_seconds",
        "Time until the response head was ready, in seconds"
    );
    metrics::describe_counter!(
        "thinkrelay_thought_fragments_total",
        "Reasoning passes by whether a fragment was injected upstream"
    );
    metrics::describe_counter!(
        "thinkrelay_heartbeats_total",
        "Keep-alive comments written to relayed streams"
    );
}

/// Prometheus metrics endpoint handler
///
/// Returns metrics in Prometheus text format for scraping. Empty when the
/// recorder was never installed.
pub async fn prometheus_metrics() -> impl IntoResponse {
    PROMETHEUS_HANDLE
        .get()
        .map(PrometheusHandle::render)
        .unwrap_or_default()
}

/// Record a completed request
pub fn record_request(status: u16, duration_secs: f64) {
    metrics::counter!("thinkrelay_requests_total", "status" => status.to_string()).increment(1);
    metrics::histogram!("thinkrelay_request_duration_seconds").record(duration_secs);
}

/// Record the result of a reasoning pass
pub fn record_thought(provider: &'static str, injected: bool) {
    let result = if injected { "injected" } else { "empty" };
    metrics::counter!(
        "thinkrelay_thought_fragments_total",
        "provider" => provider,
        "result" => result
    )
    .increment(1);
}
