//! Proxy module
//!
//! Outbound clients for the local reasoning endpoint and the upstream
//! completion endpoint.

pub mod headers;
pub mod local;
pub mod provider;
pub mod upstream;

pub use headers::UpstreamCredential;
pub use local::LocalReasoningClient;
pub use provider::{ByteStream, ReasoningProvider};
pub use upstream::{UpstreamClient, UpstreamResponse};
