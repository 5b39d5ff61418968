// ABOUTME: Defines all error types for the margin library using thiserror.
// ABOUTME: Each subsystem has its own error enum, unified under MarginError.

/// Top-level error type for the margin library.
#[derive(Debug, thiserror::Error)]
pub enum MarginError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    #[error("Document error: {0}")]
    Document(#[from] DocumentError),
}

/// Errors from LLM client operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Provider returned an empty response")]
    EmptyResponse,

    #[error("Deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Errors that end an agent run.
///
/// Tool-level problems never show up here: the executor reports them as
/// result text so the model can correct itself.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("Provider '{0}' does not support tool calling")]
    ToolsUnsupported(String),

    #[error("Agent run aborted")]
    Aborted,

    #[error(transparent)]
    Llm(#[from] LlmError),
}

/// Errors from structural document edits.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Invalid range {from}..{to} (document size {size})")]
    InvalidRange { from: usize, to: usize, size: usize },
}
