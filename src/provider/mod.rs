//! Model backend trait and implementations.

pub mod http;
pub mod openai;

use async_trait::async_trait;

use crate::config::ChatSettings;
use crate::error::BoxAgentError;
use crate::types::{ModelMessage, ToolInvocation};

/// Operation definition sent to the backend API.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct OperationDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// A request for one model turn.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub messages: Vec<ModelMessage>,
    pub operations: Vec<OperationDefinition>,
    pub settings: ChatSettings,
}

/// One model turn: either a final answer (no invocations) or a set of
/// requested invocations, possibly with accompanying text.
#[derive(Debug, Clone, Default)]
pub struct ChatReply {
    pub text: String,
    pub invocations: Vec<ToolInvocation>,
}

impl ChatReply {
    /// Create a final text reply.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            invocations: Vec::new(),
        }
    }

    /// Create a reply requesting invocations.
    pub fn invocations(invocations: Vec<ToolInvocation>) -> Self {
        Self {
            text: String::new(),
            invocations,
        }
    }

    /// Whether this reply ends the turn.
    pub fn is_final(&self) -> bool {
        self.invocations.is_empty()
    }
}

/// Core trait implemented by all model backends.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Backend name (e.g., "openai").
    fn name(&self) -> &str;

    /// Run one model turn over the conversation context.
    async fn generate(&self, request: &ChatRequest) -> Result<ChatReply, BoxAgentError>;
}
