//! OpenAI Chat Completions backend.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::BoxAgentError;
use crate::types::{ModelMessage, Role, ToolInvocation};

use super::http::{bearer_headers, shared_client, status_to_error};
use super::{ChatProvider, ChatReply, ChatRequest};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o";

pub struct OpenAiProvider {
    model: String,
    api_key: String,
    base_url: String,
}

impl OpenAiProvider {
    pub fn new(model: impl Into<String>, api_key: String, base_url: Option<String>) -> Self {
        Self {
            model: model.into(),
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }

    /// Construct from environment variables.
    ///
    /// Loads `.env` if present, then reads `OPENAI_API_KEY` (required),
    /// `OPENAI_BASE_URL`, and `BOX_AGENT_MODEL` (defaults to `gpt-4o`).
    pub fn from_env() -> Result<Self, BoxAgentError> {
        let _ = dotenvy::dotenv();
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| BoxAgentError::Configuration("Missing OPENAI_API_KEY".into()))?;
        let base_url = std::env::var("OPENAI_BASE_URL").ok();
        let model =
            std::env::var("BOX_AGENT_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Ok(Self::new(model, api_key, base_url))
    }

    fn build_request_body(&self, request: &ChatRequest) -> serde_json::Value {
        let messages = request
            .messages
            .iter()
            .map(message_to_openai)
            .collect::<Vec<_>>();

        let mut body = serde_json::json!({
            "model": self.model,
            "messages": messages,
        });

        let obj = body.as_object_mut().unwrap();

        if let Some(max) = request.settings.max_tokens {
            obj.insert("max_tokens".into(), max.into());
        }
        if let Some(temp) = request.settings.temperature {
            obj.insert("temperature".into(), temp.into());
        }
        if let Some(top_p) = request.settings.top_p {
            obj.insert("top_p".into(), top_p.into());
        }
        if let Some(ref stops) = request.settings.stop_sequences {
            obj.insert("stop".into(), serde_json::json!(stops));
        }

        if !request.operations.is_empty() {
            let tool_defs: Vec<serde_json::Value> = request
                .operations
                .iter()
                .map(|op| {
                    serde_json::json!({
                        "type": "function",
                        "function": {
                            "name": op.name,
                            "description": op.description,
                            "parameters": op.parameters,
                        }
                    })
                })
                .collect();
            obj.insert("tools".into(), tool_defs.into());
        }

        body
    }
}

#[async_trait]
impl ChatProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, request: &ChatRequest) -> Result<ChatReply, BoxAgentError> {
        let body = self.build_request_body(request);
        let url = format!("{}/chat/completions", self.base_url);

        debug!(model = %self.model, messages = request.messages.len(), "OpenAI generate");

        let resp = shared_client()
            .post(&url)
            .headers(bearer_headers(&self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(status_to_error(status, &body_text));
        }

        let data: OpenAiChatResponse = resp.json().await?;
        let choice = data
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| BoxAgentError::api(200, "No choices in OpenAI response"))?;

        let invocations = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| ToolInvocation {
                id: tc.id,
                name: tc.function.name,
                arguments: serde_json::from_str(&tc.function.arguments)
                    .unwrap_or(serde_json::Value::String(tc.function.arguments)),
            })
            .collect();

        Ok(ChatReply {
            text: choice.message.content.unwrap_or_default(),
            invocations,
        })
    }
}

fn message_to_openai(msg: &ModelMessage) -> serde_json::Value {
    let role = match msg.role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::Tool => "tool",
    };

    // Invocation results map to OpenAI tool messages, one per message.
    if let Some(result) = msg.invocation_results().first() {
        return serde_json::json!({
            "role": "tool",
            "tool_call_id": result.invocation_id,
            "content": result.result.to_string(),
        });
    }

    // Assistant message requesting invocations.
    let invocations = msg.invocations();
    if !invocations.is_empty() {
        let tc_json: Vec<serde_json::Value> = invocations
            .iter()
            .map(|inv| {
                serde_json::json!({
                    "id": inv.id,
                    "type": "function",
                    "function": {
                        "name": inv.name,
                        "arguments": inv.arguments.to_string(),
                    }
                })
            })
            .collect();
        let text = msg.text();
        return serde_json::json!({
            "role": role,
            "content": if text.is_empty() {
                serde_json::Value::Null
            } else {
                serde_json::Value::String(text)
            },
            "tool_calls": tc_json,
        });
    }

    serde_json::json!({ "role": role, "content": msg.text() })
}

// OpenAI API response types (internal)

#[derive(Deserialize)]
struct OpenAiChatResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Deserialize)]
struct OpenAiMessage {
    content: Option<String>,
    tool_calls: Option<Vec<OpenAiToolCall>>,
}

#[derive(Deserialize)]
struct OpenAiToolCall {
    id: String,
    function: OpenAiFunction,
}

#[derive(Deserialize)]
struct OpenAiFunction {
    name: String,
    arguments: String,
}
