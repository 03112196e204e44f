//! Agent execution error types.
//!
//! Used by `LlmClient::invoke` and the operations of `ChatAgent` that
//! propagate LLM failures instead of absorbing them.

use thiserror::Error;

/// Agent execution error.
///
/// Returned when an LLM call fails (transport, request build, empty
/// response). The Tree-of-Thought engine absorbs this error at its
/// adapters and degrades to safe defaults; it never escapes a search.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Execution failed with a message (e.g. LLM call failed).
    #[error("execution failed: {0}")]
    ExecutionFailed(String),
}
