//! Display-event stream adapter.
//!
//! Maps the turns appended during one `invoke` cycle to the simplified
//! event sequence a chat surface renders incrementally: user messages
//! yield nothing (the caller already shows them), assistant text yields a
//! [`DisplayEvent::Text`] unless empty, and each requested invocation
//! yields a [`DisplayEvent::ToolUsed`] before its result exists.

use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::error::BoxAgentError;
use crate::types::{ModelMessage, Role};

/// One user-visible event of a streamed turn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DisplayEvent {
    /// The agent dispatched an operation.
    ToolUsed { name: String },
    /// Assistant text to display. Never empty.
    Text { content: String },
}

/// Lazy, finite, consume-once event sequence for one turn.
pub type DisplayStream = BoxStream<'static, Result<DisplayEvent, BoxAgentError>>;

/// A streamed turn: the effective conversation id plus its event stream.
pub struct StreamingReply {
    pub conversation_id: String,
    pub events: DisplayStream,
}

impl std::fmt::Debug for StreamingReply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamingReply")
            .field("conversation_id", &self.conversation_id)
            .finish_non_exhaustive()
    }
}

/// Display events for one appended turn.
pub fn events_for_message(message: &ModelMessage) -> Vec<DisplayEvent> {
    match message.role {
        Role::System | Role::User | Role::Tool => Vec::new(),
        Role::Assistant => {
            let mut events = Vec::new();
            let text = message.text();
            if !text.is_empty() {
                events.push(DisplayEvent::Text { content: text });
            }
            for invocation in message.invocations() {
                events.push(DisplayEvent::ToolUsed {
                    name: invocation.name.clone(),
                });
            }
            events
        }
    }
}
