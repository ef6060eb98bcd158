//! Inbound chat completion request types and validation

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{AppError, AppResult};

/// Chat message role
///
/// Roles outside the four known ones are carried through verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
    Other(String),
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.as_str() {
            "system" => Role::System,
            "user" => Role::User,
            "assistant" => Role::Assistant,
            "tool" => Role::Tool,
            _ => Role::Other(value),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::System => "system".to_string(),
            Role::User => "user".to_string(),
            Role::Assistant => "assistant".to_string(),
            Role::Tool => "tool".to_string(),
            Role::Other(other) => other,
        }
    }
}

/// Chat message
///
/// Kept exactly as received so every field (including an explicit
/// `"content": null`) is forwarded unchanged. Only `role` is ever inspected.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Message(Value);

impl Message {
    /// Create a plain-text message
    pub fn text(role: Role, content: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("role".to_string(), Value::String(role.into()));
        fields.insert("content".to_string(), Value::String(content.into()));
        Self(Value::Object(fields))
    }

    /// Role of the message, when it carries a string `role`
    pub fn role(&self) -> Option<Role> {
        self.0
            .get("role")
            .and_then(Value::as_str)
            .map(|role| Role::from(role.to_string()))
    }

    /// Copy of this message with a different role
    ///
    /// Entries that are not objects are copied unchanged.
    pub fn with_role(&self, role: Role) -> Self {
        let mut copy = self.clone();
        if let Value::Object(fields) = &mut copy.0 {
            fields.insert("role".to_string(), Value::String(role.into()));
        }
        copy
    }
}

/// Chat completion request
///
/// Only `messages` is validated. `stream` is read leniently (anything but
/// `true` means a whole JSON response); it and every other field stay in
/// `extra` and are forwarded as-is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChatRequest {
    /// Validate a raw request body
    ///
    /// Fails with a validation error when the body is not a JSON object or
    /// `messages` is missing, not an array, or empty.
    pub fn from_slice(body: &[u8]) -> AppResult<Self> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| AppError::Validation(format!("Invalid JSON body: {}", e)))?;
        Self::from_value(value)
    }

    /// Validate an already-parsed request body
    pub fn from_value(value: Value) -> AppResult<Self> {
        let Value::Object(mut extra) = value else {
            return Err(AppError::Validation(
                "Request body must be a JSON object".into(),
            ));
        };

        let messages: Vec<Message> = match extra.remove("messages") {
            None => return Err(AppError::Validation("messages is required".into())),
            Some(Value::Array(messages)) if messages.is_empty() => {
                return Err(AppError::Validation("messages must not be empty".into()))
            }
            Some(Value::Array(messages)) => messages.into_iter().map(Message).collect(),
            Some(_) => return Err(AppError::Validation("messages must be an array".into())),
        };

        Ok(Self { messages, extra })
    }

    /// Whether the caller asked for an event stream
    pub fn is_streaming(&self) -> bool {
        self.extra
            .get("stream")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Last message in the conversation
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Whether this turn carries a tool result
    pub fn is_tool_turn(&self) -> bool {
        matches!(self.last_message().and_then(Message::role), Some(Role::Tool))
    }

    /// Model the caller asked for, if any
    pub fn requested_model(&self) -> Option<&str> {
        self.extra.get("model").and_then(Value::as_str)
    }
}
