//! Configuration management for Thinkrelay
//!
//! Configuration is loaded from environment variables once at startup and is
//! read-only afterwards.

use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,

    /// Base URL of the local reasoning endpoint (Ollama-compatible)
    pub local_model_url: String,
    /// Model identifier sent to the local reasoning endpoint
    pub local_model: String,

    /// Full URL of the upstream chat completions endpoint
    pub upstream_url: String,
    /// Model identifier sent to the upstream endpoint
    pub upstream_model: String,

    /// Value of the `HTTP-Referer` identification header sent upstream
    pub client_referer: String,
    /// Value of the `X-Title` identification header sent upstream
    pub client_title: String,

    /// Seconds between keep-alive comments on relayed streams
    pub heartbeat_interval_seconds: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            host: var("THINKRELAY_HOST", "0.0.0.0"),
            port: var("THINKRELAY_PORT", "9000")
                .parse()
                .context("Invalid THINKRELAY_PORT")?,

            local_model_url: var("LOCAL_MODEL_URL", "http://localhost:11434")
                .trim_end_matches('/')
                .to_string(),
            local_model: var("LOCAL_MODEL", "deepseek-r1:1.5b"),

            upstream_url: var(
                "UPSTREAM_URL",
                "https://openrouter.ai/api/v1/chat/completions",
            ),
            upstream_model: var("UPSTREAM_MODEL", "anthropic/claude-3.5-sonnet"),

            client_referer: var(
                "THINKRELAY_REFERER",
                "https://github.com/thinkrelay/thinkrelay",
            ),
            client_title: var("THINKRELAY_TITLE", "thinkrelay"),

            heartbeat_interval_seconds: var("HEARTBEAT_INTERVAL_SECONDS", "15")
                .parse()
                .context("Invalid HEARTBEAT_INTERVAL_SECONDS")?,
        })
    }

    /// Interval between heartbeat comments on relayed streams
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_seconds.max(1))
    }
}
