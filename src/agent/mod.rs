//! The tool-calling agent and its conversation state.

pub mod agent;
pub mod conversation;
pub mod stream;

pub use agent::{AgentReply, BoxAgent};
pub use conversation::{Conversation, ConversationStore};
pub use stream::{DisplayEvent, DisplayStream, StreamingReply};
