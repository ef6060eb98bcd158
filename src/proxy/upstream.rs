//! Upstream relay client
//!
//! Forwards the caller's request, primed with the local model's reasoning,
//! to the remote chat completions endpoint using the caller's own credential.

use bytes::Bytes;
use serde_json::Value;
use tracing::{debug, error, instrument};

use crate::{
    chat::{ChatRequest, Message, Role, ThoughtFragment},
    config::Config,
    error::{AppError, AppResult},
    proxy::headers::{build_upstream_headers, UpstreamCredential},
    proxy::provider::ByteStream,
};

/// Result of an upstream call
pub enum UpstreamResponse {
    /// Whole JSON body, forwarded unchanged
    Json(Bytes),
    /// Raw event stream, handed to the relay
    Stream(ByteStream),
}

/// Client for the upstream completion endpoint
pub struct UpstreamClient {
    client: reqwest::Client,
    url: String,
    model: String,
    referer: String,
    title: String,
}

impl UpstreamClient {
    /// Create a new upstream client
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            url: config.upstream_url.clone(),
            model: config.upstream_model.clone(),
            referer: config.client_referer.clone(),
            title: config.client_title.clone(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Build the upstream request
    ///
    /// All original fields are kept, the model is overridden, and a
    /// non-empty fragment is appended as a trailing assistant message.
    pub fn build_request(&self, request: &ChatRequest, fragment: &ThoughtFragment) -> ChatRequest {
        let mut merged = request.clone();
        merged
            .extra
            .insert("model".to_string(), Value::String(self.model.clone()));

        if !fragment.is_empty() {
            merged
                .messages
                .push(Message::text(Role::Assistant, fragment.as_str()));
        }

        merged
    }

    /// Send the merged request upstream
    #[instrument(skip_all, fields(model = %self.model, stream = request.is_streaming()))]
    pub async fn complete(
        &self,
        request: &ChatRequest,
        fragment: &ThoughtFragment,
        credential: &UpstreamCredential,
    ) -> AppResult<UpstreamResponse> {
        let body = self.build_request(request, fragment);
        let headers = build_upstream_headers(credential, &self.referer, &self.title)?;

        debug!(
            url = %self.url,
            messages = body.messages.len(),
            primed = !fragment.is_empty(),
            "Sending request upstream"
        );

        let response = self
            .client
            .post(&self.url)
            .headers(headers)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(url = %self.url, error = %e, "Failed to reach upstream");
                AppError::upstream(e.status().map(|s| s.as_u16()), e.to_string())
            })?;

        let status = response.status();
        debug!(status = %status, "Received upstream response");

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            error!(status = %status, body = %text, "Upstream request failed");
            return Err(AppError::upstream(
                Some(status.as_u16()),
                format!("{}: {}", status, text),
            ));
        }

        if request.is_streaming() {
            return Ok(UpstreamResponse::Stream(Box::pin(response.bytes_stream())));
        }

        let bytes = response.bytes().await.map_err(|e| {
            AppError::upstream(None, format!("Failed to read upstream response: {}", e))
        })?;
        Ok(UpstreamResponse::Json(bytes))
    }
}
