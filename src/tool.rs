//! Tool abstraction consumed by the agent layer.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// A callable capability an agent can invoke during a conversation turn.
///
/// Tools receive JSON arguments and return a JSON value. Implementations
/// must be safe to invoke repeatedly and must not require the caller to
/// manage any backing state such as the corpus index.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The tool's unique name, as advertised to the model.
    fn name(&self) -> &str;

    /// A human-readable description of when to use this tool.
    fn description(&self) -> &str;

    /// A JSON Schema describing the tool's arguments, if it takes any.
    fn parameters_schema(&self) -> Option<Value> {
        None
    }

    /// Execute the tool with the given arguments.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Tool`](crate::error::RagError::Tool) for invalid
    /// arguments; other failures propagate from the underlying boundary
    /// (retrieval, embedding, language model, network).
    async fn execute(&self, args: Value) -> Result<Value>;
}
