//! The tool-calling agent.
//!
//! One `invoke` runs a bounded loop: call the model over the conversation
//! context; if the reply requests invocations, dispatch them against the
//! catalog, append the results, and call the model again; otherwise append
//! the final answer and return. Operation failures are fed back to the
//! model as error-marked results; model failures end the turn.

use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::sync::OwnedMutexGuard;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

use crate::catalog::{OperationCatalog, OperationContext};
use crate::config::AgentConfig;
use crate::error::{BoxAgentError, Result};
use crate::provider::{ChatProvider, ChatRequest};
use crate::types::ModelMessage;

use super::conversation::{Conversation, ConversationStore};
use super::stream::{events_for_message, DisplayEvent, StreamingReply};

/// The outcome of one completed turn.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentReply {
    /// Effective conversation id; equals the supplied id or a generated
    /// UUID when none was given. Reuse it to continue the conversation.
    pub conversation_id: String,
    /// Final assistant text. May be empty if the model chose to say
    /// nothing; an empty answer is still an answer, not a failure.
    pub text: String,
}

type EventSink = mpsc::UnboundedSender<Result<DisplayEvent>>;

/// Conversational agent binding a model backend to an operation catalog.
///
/// The catalog is shared read-only across all conversations; conversation
/// state is owned here and serialized per conversation id. Cloning the
/// agent shares all state.
#[derive(Clone)]
pub struct BoxAgent {
    provider: Arc<dyn ChatProvider>,
    catalog: Arc<OperationCatalog>,
    conversations: ConversationStore,
    config: AgentConfig,
}

impl BoxAgent {
    /// Create an agent with the default configuration.
    pub fn new(provider: Arc<dyn ChatProvider>, catalog: Arc<OperationCatalog>) -> Self {
        Self {
            provider,
            catalog,
            conversations: ConversationStore::new(),
            config: AgentConfig::default(),
        }
    }

    pub fn with_config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    pub fn catalog(&self) -> &OperationCatalog {
        &self.catalog
    }

    /// Snapshot of a conversation's history, if it exists.
    pub async fn history(&self, conversation_id: &str) -> Option<Vec<ModelMessage>> {
        self.conversations.history(conversation_id).await
    }

    /// Run one turn and return the final answer.
    ///
    /// With `conversation_id: None` a fresh conversation is started under
    /// a generated id, carried in the returned [`AgentReply`].
    ///
    /// # Errors
    ///
    /// [`BoxAgentError::ConversationBusy`] when a turn is already in
    /// progress for this id; [`BoxAgentError::ModelUnavailable`] when the
    /// backend fails (retry the whole turn); [`BoxAgentError::ToolLoopExceeded`]
    /// when the model never converges within the configured bound.
    pub async fn invoke(&self, query: &str, conversation_id: Option<&str>) -> Result<AgentReply> {
        self.invoke_with_cancellation(query, conversation_id, CancellationToken::new())
            .await
    }

    /// Like [`invoke`](Self::invoke), honoring a cancellation token.
    ///
    /// Cancellation is observed before each model call and before each
    /// operation dispatch. An operation already dispatched runs to
    /// completion and its result is appended, so history stays consistent
    /// with side effects that already happened.
    pub async fn invoke_with_cancellation(
        &self,
        query: &str,
        conversation_id: Option<&str>,
        cancel: CancellationToken,
    ) -> Result<AgentReply> {
        let conversation_id = resolve_conversation_id(conversation_id);
        let guard = self.conversations.acquire(&conversation_id)?;
        let text = self
            .run_turn(guard, &conversation_id, query.to_string(), None, cancel)
            .await?;
        Ok(AgentReply {
            conversation_id,
            text,
        })
    }

    /// Run one turn, streaming display events as they occur.
    ///
    /// The returned stream is lazy, finite, and consumed exactly once; a
    /// fatal turn error arrives in-band as its last item.
    pub fn invoke_streaming(
        &self,
        query: &str,
        conversation_id: Option<&str>,
    ) -> Result<StreamingReply> {
        self.invoke_streaming_with_cancellation(query, conversation_id, CancellationToken::new())
    }

    /// Like [`invoke_streaming`](Self::invoke_streaming), honoring a
    /// cancellation token.
    pub fn invoke_streaming_with_cancellation(
        &self,
        query: &str,
        conversation_id: Option<&str>,
        cancel: CancellationToken,
    ) -> Result<StreamingReply> {
        let conversation_id = resolve_conversation_id(conversation_id);
        // Busy detection happens here, before the stream exists.
        let guard = self.conversations.acquire(&conversation_id)?;

        let (tx, rx) = mpsc::unbounded_channel();
        let agent = self.clone();
        let id = conversation_id.clone();
        let query = query.to_string();
        tokio::spawn(async move {
            let sink = tx.clone();
            if let Err(err) = agent
                .run_turn(guard, &id, query, Some(sink), cancel)
                .await
            {
                let _ = tx.send(Err(err));
            }
        });

        Ok(StreamingReply {
            conversation_id,
            events: UnboundedReceiverStream::new(rx).boxed(),
        })
    }

    /// The turn loop. Holds the conversation guard for its whole duration.
    async fn run_turn(
        &self,
        mut guard: OwnedMutexGuard<Conversation>,
        conversation_id: &str,
        query: String,
        sink: Option<EventSink>,
        cancel: CancellationToken,
    ) -> Result<String> {
        if guard.is_empty() {
            if let Some(ref prompt) = self.config.system_prompt {
                guard.append(ModelMessage::system(prompt.clone()));
            }
        }
        guard.append(ModelMessage::user(query));

        let operations = self.catalog.definitions();
        let limit = self.config.max_tool_loops.max(1);

        for cycle in 1..=limit {
            if cancel.is_cancelled() {
                return Err(BoxAgentError::Canceled);
            }

            let request = ChatRequest {
                messages: guard.messages().to_vec(),
                operations: operations.clone(),
                settings: self.config.settings.clone(),
            };
            debug!(
                conversation = conversation_id,
                cycle,
                messages = request.messages.len(),
                "model call"
            );
            let reply = self.provider.generate(&request).await.map_err(|source| {
                BoxAgentError::ModelUnavailable {
                    provider: self.provider.name().to_string(),
                    source: Box::new(source),
                }
            })?;

            if reply.is_final() {
                let message = ModelMessage::assistant(reply.text.clone());
                emit(&sink, &message);
                guard.append(message);
                debug!(conversation = conversation_id, cycle, "turn complete");
                return Ok(reply.text);
            }

            let message = ModelMessage::assistant_with_invocations(
                reply.text.clone(),
                reply.invocations.clone(),
            );
            emit(&sink, &message);
            guard.append(message);

            for invocation in &reply.invocations {
                if cancel.is_cancelled() {
                    return Err(BoxAgentError::Canceled);
                }
                let ctx = OperationContext {
                    invocation_id: Some(invocation.id.clone()),
                };
                let outcome = self
                    .catalog
                    .invoke(&invocation.name, invocation.arguments.clone(), &ctx)
                    .await;
                let (value, is_error) = match outcome {
                    Ok(value) => (value, false),
                    Err(err) => {
                        debug!(
                            conversation = conversation_id,
                            operation = %invocation.name,
                            error = %err,
                            "operation failed; reported to the model"
                        );
                        (serde_json::json!({ "error": err.to_string() }), true)
                    }
                };
                guard.append(ModelMessage::invocation_result(
                    invocation.id.clone(),
                    invocation.name.clone(),
                    value,
                    is_error,
                ));
            }
        }

        Err(BoxAgentError::ToolLoopExceeded { limit })
    }
}

fn emit(sink: &Option<EventSink>, message: &ModelMessage) {
    let Some(sink) = sink else { return };
    for event in events_for_message(message) {
        let _ = sink.send(Ok(event));
    }
}

fn resolve_conversation_id(conversation_id: Option<&str>) -> String {
    match conversation_id {
        Some(id) => id.to_string(),
        None => Uuid::new_v4().to_string(),
    }
}
