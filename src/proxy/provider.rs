//! Reasoning provider abstraction
//!
//! The local reasoning model sits behind a trait so the request pipeline can
//! be driven by any backend that produces thought fragments.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;

use crate::chat::{ChatRequest, ThoughtFragment};
use crate::error::AppResult;

/// Stream type for streaming responses from model endpoints
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>;

/// Source of reasoning used to prime the upstream model
#[async_trait]
pub trait ReasoningProvider: Send + Sync {
    /// Get the provider name for logging and metrics
    fn name(&self) -> &'static str;

    /// Produce a thought fragment for this request.
    ///
    /// Implementations return an empty fragment for tool-result turns without
    /// contacting the backend.
    async fn think(&self, request: &ChatRequest) -> AppResult<ThoughtFragment>;
}
