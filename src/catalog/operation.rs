//! Operation trait, closure-based operations, and the catalog registry.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::arguments::OperationArguments;
use super::types::OperationParameters;
use super::validation::validate_arguments;
use crate::error::BoxAgentError;
use crate::provider::OperationDefinition;

/// Side-effect classification of an operation.
///
/// The catalog never retries a failed invocation in either class; a
/// `Mutating` operation's side effects happen exactly once per successful
/// invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideEffect {
    ReadOnly,
    Mutating,
}

/// Context available during operation execution.
#[derive(Debug, Clone, Default)]
pub struct OperationContext {
    /// Correlation id of the invocation being served, when known.
    pub invocation_id: Option<String>,
}

/// Core operation trait — implement to expose a capability to the model.
#[async_trait]
pub trait Operation: Send + Sync {
    /// Operation name (must match what the model calls).
    fn name(&self) -> &str;

    /// Human-readable description.
    fn description(&self) -> &str;

    /// JSON Schema parameters.
    fn parameters(&self) -> &OperationParameters;

    /// Whether this operation mutates the underlying store.
    fn side_effect(&self) -> SideEffect {
        SideEffect::ReadOnly
    }

    /// Execute the operation with validated arguments.
    async fn execute(
        &self,
        args: &OperationArguments,
        ctx: &OperationContext,
    ) -> Result<serde_json::Value, BoxAgentError>;
}

/// Type alias for the operation handler function.
type OperationHandler = dyn Fn(
        OperationArguments,
        OperationContext,
    ) -> Pin<Box<dyn Future<Output = Result<serde_json::Value, BoxAgentError>> + Send>>
    + Send
    + Sync;

/// Closure-based operation for quick construction.
pub struct ClosureOperation {
    name: String,
    description: String,
    parameters: OperationParameters,
    side_effect: SideEffect,
    handler: Arc<OperationHandler>,
}

impl ClosureOperation {
    /// Create a read-only operation from a closure.
    pub fn new<F, Fut>(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: OperationParameters,
        handler: F,
    ) -> Self
    where
        F: Fn(OperationArguments, OperationContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<serde_json::Value, BoxAgentError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            side_effect: SideEffect::ReadOnly,
            handler: Arc::new(move |args, ctx| Box::pin(handler(args, ctx))),
        }
    }

    /// Mark the operation as mutating the underlying store.
    pub fn mutating(mut self) -> Self {
        self.side_effect = SideEffect::Mutating;
        self
    }
}

#[async_trait]
impl Operation for ClosureOperation {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> &OperationParameters {
        &self.parameters
    }

    fn side_effect(&self) -> SideEffect {
        self.side_effect
    }

    async fn execute(
        &self,
        args: &OperationArguments,
        ctx: &OperationContext,
    ) -> Result<serde_json::Value, BoxAgentError> {
        (self.handler)(args.clone(), ctx.clone()).await
    }
}

impl std::fmt::Debug for ClosureOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClosureOperation")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("side_effect", &self.side_effect)
            .finish()
    }
}

/// Registry of operations, constructed once and shared read-only.
///
/// Registration order is preserved and is the order operations are
/// advertised to the model.
#[derive(Default)]
pub struct OperationCatalog {
    operations: Vec<Arc<dyn Operation>>,
}

impl OperationCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an operation.
    ///
    /// # Errors
    ///
    /// Returns [`BoxAgentError::DuplicateOperation`] if the name is taken.
    pub fn register(&mut self, operation: Arc<dyn Operation>) -> Result<(), BoxAgentError> {
        if self.get(operation.name()).is_some() {
            return Err(BoxAgentError::DuplicateOperation(
                operation.name().to_string(),
            ));
        }
        self.operations.push(operation);
        Ok(())
    }

    /// Look up an operation by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Operation>> {
        self.operations.iter().find(|op| op.name() == name)
    }

    /// Registered operation names, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.operations.iter().map(|op| op.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Wire definitions for every registered operation.
    pub fn definitions(&self) -> Vec<OperationDefinition> {
        self.operations
            .iter()
            .map(|op| OperationDefinition {
                name: op.name().to_string(),
                description: op.description().to_string(),
                parameters: op.parameters().schema.clone(),
            })
            .collect()
    }

    /// Invoke an operation by name with raw JSON arguments.
    ///
    /// Arguments are validated against the operation's schema before the
    /// body runs. A failure raised by the body is wrapped as
    /// [`BoxAgentError::OperationExecution`] carrying the original cause
    /// and is never retried here.
    pub async fn invoke(
        &self,
        name: &str,
        arguments: serde_json::Value,
        ctx: &OperationContext,
    ) -> Result<serde_json::Value, BoxAgentError> {
        let operation = self
            .get(name)
            .ok_or_else(|| BoxAgentError::UnknownOperation(name.to_string()))?;

        validate_arguments(&arguments, &operation.parameters().schema).map_err(|message| {
            BoxAgentError::InvalidArguments {
                operation: name.to_string(),
                message,
            }
        })?;

        debug!(operation = name, "invoking operation");
        let args = OperationArguments::new(arguments);
        operation
            .execute(&args, ctx)
            .await
            .map_err(|source| BoxAgentError::OperationExecution {
                operation: name.to_string(),
                source: Box::new(source),
            })
    }
}

impl std::fmt::Debug for OperationCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationCatalog")
            .field("operations", &self.names())
            .finish()
    }
}
