//! Shared test helpers and scripted model backends.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Notify;

use box_agent::catalog::builtin::catalog_for;
use box_agent::error::BoxAgentError;
use box_agent::provider::{ChatProvider, ChatReply, ChatRequest};
use box_agent::store::InMemoryStore;
use box_agent::types::ToolInvocation;

/// A backend that replays a fixed script of replies, front to back.
///
/// Every request is recorded for later inspection. Generating past the
/// end of the script fails, which the agent surfaces as
/// [`BoxAgentError::ModelUnavailable`].
pub struct ScriptedProvider {
    script: Mutex<Vec<ChatReply>>,
    calls: AtomicUsize,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedProvider {
    pub fn new(script: Vec<ChatReply>) -> Self {
        Self {
            script: Mutex::new(script),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Number of `generate` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Requests seen so far, in order.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, request: &ChatRequest) -> Result<ChatReply, BoxAgentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        let mut script = self.script.lock().unwrap();
        if script.is_empty() {
            return Err(BoxAgentError::api(503, "script exhausted"));
        }
        Ok(script.remove(0))
    }
}

/// A backend that requests the same invocation on every call, so the
/// agent never converges. Invocation ids are unique per call.
pub struct RepeatingProvider {
    calls: AtomicUsize,
}

impl RepeatingProvider {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatProvider for RepeatingProvider {
    fn name(&self) -> &str {
        "repeating"
    }

    async fn generate(&self, _request: &ChatRequest) -> Result<ChatReply, BoxAgentError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ChatReply::invocations(vec![ToolInvocation {
            id: format!("call_{n}"),
            name: "whoami".into(),
            arguments: json!({}),
        }]))
    }
}

/// A backend that parks inside `generate` until released, for observing
/// the agent mid-turn.
pub struct GatedProvider {
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
}

impl GatedProvider {
    pub fn new() -> Self {
        Self {
            entered: Arc::new(Notify::new()),
            release: Arc::new(Notify::new()),
        }
    }
}

#[async_trait]
impl ChatProvider for GatedProvider {
    fn name(&self) -> &str {
        "gated"
    }

    async fn generate(&self, _request: &ChatRequest) -> Result<ChatReply, BoxAgentError> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(ChatReply::text("released"))
    }
}

/// The demo catalog every agent test runs against.
pub fn demo_catalog() -> Arc<box_agent::catalog::OperationCatalog> {
    Arc::new(catalog_for(Arc::new(InMemoryStore::demo())))
}

/// Shorthand for a single-invocation reply.
pub fn invocation_reply(id: &str, name: &str, arguments: serde_json::Value) -> ChatReply {
    ChatReply::invocations(vec![ToolInvocation {
        id: id.into(),
        name: name.into(),
        arguments,
    }])
}
