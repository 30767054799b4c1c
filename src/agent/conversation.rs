//! Keyed conversation state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::error::{BoxAgentError, Result};
use crate::types::ModelMessage;

/// Append-only message history of one conversation.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<ModelMessage>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one turn. The sole mutator; arrival order is preserved.
    pub fn append(&mut self, message: ModelMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ModelMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Registry of conversations keyed by opaque id.
///
/// Each conversation sits behind its own async mutex; a turn holds the
/// mutex for its whole duration, which serializes turns per conversation.
/// Conversations are created on first use and never implicitly deleted.
#[derive(Debug, Clone, Default)]
pub struct ConversationStore {
    inner: Arc<StdMutex<HashMap<String, Arc<Mutex<Conversation>>>>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create a conversation by id.
    pub fn get_or_create(&self, conversation_id: &str) -> Arc<Mutex<Conversation>> {
        let mut map = self.inner.lock().expect("conversation map poisoned");
        map.entry(conversation_id.to_string())
            .or_default()
            .clone()
    }

    /// Take exclusive hold of a conversation for one turn.
    ///
    /// Fails fast with [`BoxAgentError::ConversationBusy`] when another
    /// turn is in progress; there is no queuing.
    pub fn acquire(&self, conversation_id: &str) -> Result<OwnedMutexGuard<Conversation>> {
        self.get_or_create(conversation_id)
            .try_lock_owned()
            .map_err(|_| BoxAgentError::ConversationBusy(conversation_id.to_string()))
    }

    /// Snapshot of a conversation's history, if it exists.
    ///
    /// Waits for an in-flight turn to finish rather than observing a
    /// half-written batch.
    pub async fn history(&self, conversation_id: &str) -> Option<Vec<ModelMessage>> {
        let conversation = {
            let map = self.inner.lock().expect("conversation map poisoned");
            map.get(conversation_id).cloned()
        }?;
        let guard = conversation.lock().await;
        Some(guard.messages().to_vec())
    }

    /// Known conversation ids.
    pub fn conversation_ids(&self) -> Vec<String> {
        let map = self.inner.lock().expect("conversation map poisoned");
        map.keys().cloned().collect()
    }
}
