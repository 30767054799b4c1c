//! Error types for box-agent.

use thiserror::Error;

/// Primary error type for all box-agent operations.
#[derive(Error, Debug)]
pub enum BoxAgentError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Rate limited: retry after {retry_after_ms:?}ms")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Operation already registered: {0}")]
    DuplicateOperation(String),

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Invalid arguments for '{operation}': {message}")]
    InvalidArguments { operation: String, message: String },

    #[error("Operation '{operation}' failed: {source}")]
    OperationExecution {
        operation: String,
        #[source]
        source: Box<BoxAgentError>,
    },

    #[error("Tool loop exceeded {limit} iterations without a final answer")]
    ToolLoopExceeded { limit: usize },

    #[error("Model backend '{provider}' unavailable: {source}")]
    ModelUnavailable {
        provider: String,
        #[source]
        source: Box<BoxAgentError>,
    },

    #[error("Conversation '{0}' has a turn in progress")]
    ConversationBusy(String),

    #[error("Turn canceled")]
    Canceled,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl BoxAgentError {
    /// Create an API error from a status code and body.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Whether the whole turn may be retried by the caller.
    ///
    /// `ModelUnavailable` and `ConversationBusy` are transient;
    /// `ToolLoopExceeded` is not (retrying reproduces the same loop).
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ModelUnavailable { .. }
                | Self::ConversationBusy(_)
                | Self::Network(_)
                | Self::RateLimited { .. }
        )
    }

    /// Whether this failure is fed back into the conversation as data
    /// rather than terminating the turn.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::UnknownOperation(_)
                | Self::InvalidArguments { .. }
                | Self::OperationExecution { .. }
        )
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, BoxAgentError>;
