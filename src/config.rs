//! Agent configuration.

use serde::{Deserialize, Serialize};

/// Default bound on model-call/tool-dispatch cycles per turn.
pub const DEFAULT_MAX_TOOL_LOOPS: usize = 10;

/// Default system prompt steering the model toward the catalog.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant that manages a user's \
document storage. Use the available operations to look up, read, and analyze documents. \
When listing files or folders, always attribute each one with its id.";

/// Generation settings forwarded to the model backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_sequences: Option<Vec<String>>,
}

/// Configuration for a [`BoxAgent`](crate::agent::BoxAgent).
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Maximum model-call cycles per turn before the turn fails with
    /// `ToolLoopExceeded`. Must be at least 1.
    pub max_tool_loops: usize,
    /// System prompt prepended when a conversation starts. `None` disables.
    pub system_prompt: Option<String>,
    /// Generation settings for every model call.
    pub settings: ChatSettings,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_tool_loops: DEFAULT_MAX_TOOL_LOOPS,
            system_prompt: Some(DEFAULT_SYSTEM_PROMPT.to_string()),
            settings: ChatSettings::default(),
        }
    }
}

impl AgentConfig {
    pub fn with_max_tool_loops(mut self, max: usize) -> Self {
        self.max_tool_loops = max;
        self
    }

    pub fn with_system_prompt(mut self, prompt: Option<String>) -> Self {
        self.system_prompt = prompt;
        self
    }

    pub fn with_settings(mut self, settings: ChatSettings) -> Self {
        self.settings = settings;
        self
    }
}
