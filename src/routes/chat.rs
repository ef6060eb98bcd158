//! Chat completions endpoint
//!
//! OpenAI-compatible chat completions API endpoint.
//! Handles both streaming and non-streaming responses.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use tracing::{debug, info};

use crate::{
    chat::ChatRequest,
    error::{AppError, AppResult},
    proxy::{ByteStream, UpstreamCredential, UpstreamResponse},
    routes::metrics::{record_request, record_thought},
    AppState,
};

/// Handle chat completion requests
///
/// Validates the request, primes it with local reasoning, and relays the
/// upstream response. Every failure ends up in `AppError`'s response mapping.
pub async fn chat_completions(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Response {
    let start_time = Instant::now();

    let response = match process(&state, request).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    };

    record_request(response.status().as_u16(), start_time.elapsed().as_secs_f64());
    response
}

async fn process(state: &AppState, request: Request) -> AppResult<Response> {
    let (parts, body) = request.into_parts();

    let body = axum::body::to_bytes(body, usize::MAX)
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read request body: {}", e)))?;

    let chat_request = ChatRequest::from_slice(&body)?;
    let credential = UpstreamCredential::from_headers(&parts.headers)?;

    info!(
        stream = chat_request.is_streaming(),
        messages = chat_request.messages.len(),
        requested_model = chat_request.requested_model().unwrap_or("-"),
        upstream_model = %state.upstream.model(),
        "Processing chat completion request"
    );

    let fragment = state.reasoner.think(&chat_request).await?;
    record_thought(state.reasoner.name(), !fragment.is_empty());

    match state
        .upstream
        .complete(&chat_request, &fragment, &credential)
        .await?
    {
        UpstreamResponse::Json(bytes) => json_response(bytes),
        UpstreamResponse::Stream(stream) => stream_response(state, stream),
    }
}

/// Forward a whole upstream JSON body unchanged
fn json_response(bytes: Bytes) -> AppResult<Response> {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(bytes))
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to build response: {}", e)))
}

/// Relay an upstream event stream with heartbeats
fn stream_response(state: &AppState, stream: ByteStream) -> AppResult<Response> {
    debug!(
        heartbeat_secs = state.relay.heartbeat_interval().as_secs(),
        "Relaying upstream event stream"
    );
    let handle = state.relay.relay(stream);

    // The relay task ends on its own once upstream finishes or the caller leaves
    drop(handle.task);

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .header(header::CONNECTION, "keep-alive")
        .header("X-Accel-Buffering", "no")
        .body(Body::from_stream(handle.body))
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to build response: {}", e)))
}
