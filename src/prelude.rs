// ABOUTME: Prelude module - convenient imports for common use cases.
// ABOUTME: Use `use margin::prelude::*;` to get started quickly.

pub use crate::agent::{
    AgentLoop, AgentOutcome, ITERATION_LIMIT_MESSAGE, StopCondition, run_agent_loop,
    status_label,
};
pub use crate::document::{
    Block, BlockKind, Document, DocumentContext, Mark, RichDocument, Selection, TextRun,
    text_offset_to_position,
};
pub use crate::error::{AgentError, DocumentError, LlmError, MarginError};
pub use crate::llm::{
    AnthropicClient, GeminiClient, LlmClient, Message, OpenAIClient, ProviderConfig, ProviderId,
    Request, Role, StreamedText, ToolCalling, ToolCompletionResponse, ToolDefinition,
    ToolResultTurns, collect_stream, create_provider,
};
pub use crate::tool::{DocumentTool, Registry, ToolCall, ToolExecutor, ToolOutput, ToolResult};
pub use crate::tools::{DocumentToolExecutor, create_tool_executor};
