//! Chat request model
//!
//! Inbound request types, validation, and the thought fragments produced by
//! the local reasoning model.

pub mod request;
pub mod thought;

pub use request::{ChatRequest, Message, Role};
pub use thought::ThoughtFragment;
