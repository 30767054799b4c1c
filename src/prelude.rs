//! Common re-exports.

pub use crate::agent::{AgentReply, BoxAgent, DisplayEvent, StreamingReply};
pub use crate::catalog::builtin::catalog_for;
pub use crate::catalog::{
    ClosureOperation, Operation, OperationCatalog, OperationParameters, SideEffect,
};
pub use crate::config::{AgentConfig, ChatSettings};
pub use crate::error::{BoxAgentError, Result};
pub use crate::provider::{ChatProvider, ChatReply, ChatRequest};
pub use crate::store::{DocumentStore, InMemoryStore, SearchQuery};
pub use crate::types::{ModelMessage, Role, ToolInvocation};
