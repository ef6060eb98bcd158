//! Thinkrelay - chat completion proxy with local reasoning priming
//!
//! Each chat completion request is first shown to a fast local model. Its
//! visible reasoning is injected into the conversation before the request is
//! forwarded to a more capable upstream model, whose response is relayed back
//! to the caller.

pub mod chat;
pub mod config;
pub mod error;
pub mod proxy;
pub mod routes;
pub mod streaming;

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;

pub use crate::chat::{ChatRequest, Message, Role, ThoughtFragment};
pub use crate::config::Config;
pub use crate::error::{AppError, AppResult};
pub use crate::proxy::{LocalReasoningClient, ReasoningProvider, UpstreamClient};
pub use crate::streaming::StreamRelay;

/// Application state shared across all request handlers
///
/// Built once at startup and never mutated afterwards.
pub struct AppState {
    pub config: Config,
    pub start_time: Instant,
    /// Source of thought fragments (the local model by default)
    pub reasoner: Arc<dyn ReasoningProvider>,
    /// Client for the upstream completion endpoint
    pub upstream: Arc<UpstreamClient>,
    /// Relay for streamed upstream responses
    pub relay: StreamRelay,
}

impl AppState {
    /// Create a new application state
    pub fn new(config: Config) -> Result<Self> {
        // No request timeout: long generations are expected
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(100)
            .build()?;

        let reasoner: Arc<dyn ReasoningProvider> =
            Arc::new(LocalReasoningClient::new(http_client.clone(), &config));

        Ok(Self::with_reasoner(config, http_client, reasoner))
    }

    /// Create application state with a specific reasoning provider
    ///
    /// `http_client` is used for the upstream endpoint.
    pub fn with_reasoner(
        config: Config,
        http_client: reqwest::Client,
        reasoner: Arc<dyn ReasoningProvider>,
    ) -> Self {
        let upstream = Arc::new(UpstreamClient::new(http_client.clone(), &config));
        let relay = StreamRelay::new(config.heartbeat_interval());

        Self {
            config,
            start_time: Instant::now(),
            reasoner,
            upstream,
            relay,
        }
    }
}
