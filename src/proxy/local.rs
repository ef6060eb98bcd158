//! Local reasoning client
//!
//! Talks to an Ollama-compatible `/api/chat` endpoint and turns its
//! newline-delimited JSON output into a [`ThoughtFragment`].

use async_trait::async_trait;
use futures::StreamExt;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, error, info, instrument};

use crate::{
    chat::{thought::THINK_CLOSE, ChatRequest, Message, Role, ThoughtFragment},
    config::Config,
    error::{AppError, AppResult},
    proxy::provider::ReasoningProvider,
    streaming::LineBuffer,
};

/// Request fields the local model cannot use
///
/// The caller's `stream` flag is dropped too; the local endpoint's own
/// default applies and the whole output is read either way.
const DROPPED_FIELDS: &[&str] = &["tools", "tool_choice", "stream"];

/// One line of the local endpoint's streamed output
#[derive(Debug, Deserialize)]
struct ChatChunk {
    #[serde(default)]
    message: Option<ChunkMessage>,
    #[serde(default)]
    done: bool,
}

#[derive(Debug, Deserialize)]
struct ChunkMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Accumulates content deltas until the first `done` line
#[derive(Debug, Default)]
struct ChunkAccumulator {
    text: String,
    done: bool,
    skipped: usize,
}

impl ChunkAccumulator {
    /// Apply one line; lines that are not valid chunks are ignored
    fn push_line(&mut self, line: &str) {
        if self.done {
            return;
        }
        match serde_json::from_str::<ChatChunk>(line) {
            Ok(chunk) => {
                if let Some(content) = chunk.message.and_then(|m| m.content) {
                    self.text.push_str(&content);
                }
                self.done = chunk.done;
            }
            Err(_) => self.skipped += 1,
        }
    }
}

/// Client for the local reasoning endpoint
pub struct LocalReasoningClient {
    client: reqwest::Client,
    chat_url: String,
    model: String,
}

impl LocalReasoningClient {
    /// Create a new local reasoning client
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            chat_url: format!("{}/api/chat", config.local_model_url),
            model: config.local_model.clone(),
        }
    }

    /// Build the request sent to the local model
    ///
    /// Tool schemas are dropped, tool turns become user turns, the model is
    /// forced, and generation stops at the end of the reasoning block.
    pub fn build_request(&self, request: &ChatRequest) -> AppResult<Value> {
        let messages: Vec<Message> = request
            .messages
            .iter()
            .map(|m| match m.role() {
                Some(Role::Tool) => m.with_role(Role::User),
                _ => m.clone(),
            })
            .collect();

        let mut body: Map<String, Value> = request
            .extra
            .iter()
            .filter(|(key, _)| !DROPPED_FIELDS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        let mut options = match body.remove("options") {
            Some(Value::Object(options)) => options,
            _ => Map::new(),
        };
        options.insert("stop".to_string(), json!([THINK_CLOSE]));

        body.insert("model".to_string(), Value::String(self.model.clone()));
        let messages = serde_json::to_value(&messages)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize messages: {}", e)))?;
        body.insert("messages".to_string(), messages);
        body.insert("stop".to_string(), json!([THINK_CLOSE]));
        body.insert("options".to_string(), Value::Object(options));

        Ok(Value::Object(body))
    }

    #[instrument(skip(self, request), fields(model = %self.model))]
    async fn fetch_reasoning(&self, request: &ChatRequest) -> AppResult<String> {
        let body = self.build_request(request)?;

        debug!(url = %self.chat_url, messages = request.messages.len(), "Requesting local reasoning");

        let response = self
            .client
            .post(&self.chat_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(url = %self.chat_url, error = %e, "Local model unreachable");
                AppError::local_model(e.status().map(|s| s.as_u16()), e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            error!(status = %status, body = %text, "Local model request failed");
            return Err(AppError::local_model(
                Some(status.as_u16()),
                format!("{}: {}", status, text),
            ));
        }

        let mut accumulator = ChunkAccumulator::default();
        let mut lines = LineBuffer::new();
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let bytes = chunk.map_err(|e| {
                AppError::local_model(None, format!("Failed to read local model output: {}", e))
            })?;
            for line in lines.feed(&bytes) {
                accumulator.push_line(&line);
            }
            if accumulator.done {
                break;
            }
        }
        if let Some(line) = lines.finish() {
            accumulator.push_line(&line);
        }

        if accumulator.skipped > 0 {
            debug!(skipped = accumulator.skipped, "Skipped unparseable local model lines");
        }

        Ok(accumulator.text)
    }
}

#[async_trait]
impl ReasoningProvider for LocalReasoningClient {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn think(&self, request: &ChatRequest) -> AppResult<ThoughtFragment> {
        if request.is_tool_turn() {
            debug!("Tool result turn, skipping local reasoning");
            return Ok(ThoughtFragment::empty());
        }

        let text = self.fetch_reasoning(request).await?;
        let fragment = ThoughtFragment::extract(&text);

        info!(
            output_len = text.len(),
            fragment_len = fragment.len(),
            "Local reasoning complete"
        );

        Ok(fragment)
    }
}
