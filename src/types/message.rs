//! Message types for the conversation history.
//!
//! A conversation is an append-only sequence of [`ModelMessage`]s. Each
//! message has a role and one or more content parts; tool-use turns carry
//! [`ToolInvocation`] parts on the assistant message and are answered by
//! [`InvocationResult`] parts on tool messages, correlated by invocation id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelMessage {
    pub role: Role,
    pub content: Vec<ContentPart>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ModelMessage {
    /// Create a system message.
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: vec![ContentPart::Text { text: text.into() }],
            timestamp: Some(Utc::now()),
        }
    }

    /// Create a user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![ContentPart::Text { text: text.into() }],
            timestamp: Some(Utc::now()),
        }
    }

    /// Create an assistant message with plain text.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: vec![ContentPart::Text { text: text.into() }],
            timestamp: Some(Utc::now()),
        }
    }

    /// Create an assistant message carrying requested invocations.
    ///
    /// Empty text yields no text part, so the display adapter never sees a
    /// blank text chunk.
    pub fn assistant_with_invocations(
        text: impl Into<String>,
        invocations: Vec<ToolInvocation>,
    ) -> Self {
        let text = text.into();
        let mut content = Vec::with_capacity(invocations.len() + 1);
        if !text.is_empty() {
            content.push(ContentPart::Text { text });
        }
        content.extend(invocations.into_iter().map(ContentPart::Invocation));
        Self {
            role: Role::Assistant,
            content,
            timestamp: Some(Utc::now()),
        }
    }

    /// Create a tool message answering one invocation.
    pub fn invocation_result(
        invocation_id: impl Into<String>,
        operation: impl Into<String>,
        result: serde_json::Value,
        is_error: bool,
    ) -> Self {
        Self {
            role: Role::Tool,
            content: vec![ContentPart::InvocationResult(InvocationResult {
                invocation_id: invocation_id.into(),
                operation: operation.into(),
                result,
                is_error,
            })],
            timestamp: Some(Utc::now()),
        }
    }

    /// Concatenated text content of this message.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|part| match part {
                ContentPart::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// Invocations requested by this message.
    pub fn invocations(&self) -> Vec<&ToolInvocation> {
        self.content
            .iter()
            .filter_map(|part| match part {
                ContentPart::Invocation(inv) => Some(inv),
                _ => None,
            })
            .collect()
    }

    /// Invocation results carried by this message.
    pub fn invocation_results(&self) -> Vec<&InvocationResult> {
        self.content
            .iter()
            .filter_map(|part| match part {
                ContentPart::InvocationResult(res) => Some(res),
                _ => None,
            })
            .collect()
    }
}

/// Conversation role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// A single part of message content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    Invocation(ToolInvocation),
    InvocationResult(InvocationResult),
}

/// A request to run one catalog operation with concrete arguments.
///
/// The id correlates the request with the [`InvocationResult`] answering it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolInvocation {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

/// The outcome of one invocation, success or error, fed back to the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvocationResult {
    pub invocation_id: String,
    pub operation: String,
    pub result: serde_json::Value,
    #[serde(default)]
    pub is_error: bool,
}
