// ABOUTME: Defines the DocumentTool trait (one capability over a live document)
// ABOUTME: and the ToolExecutor trait the agent loop drives.

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::{ToolCall, ToolOutput};
use crate::document::{Document, DocumentContext};

/// A tool the model can invoke against the open document.
pub trait DocumentTool: Send + Sync {
    /// Returns the unique name of this tool.
    fn name(&self) -> &str;

    /// Returns a human-readable description for the LLM.
    fn description(&self) -> &str;

    /// Returns the JSON Schema for the tool's input parameters.
    fn schema(&self) -> Value;

    /// Run the tool. Bad input is reported through [`ToolOutput::error`],
    /// never by panicking.
    fn execute(
        &self,
        args: &Map<String, Value>,
        document: &mut dyn Document,
        context: &DocumentContext,
    ) -> ToolOutput;
}

/// Executes tool calls on behalf of the agent loop.
///
/// Implementations must always return text: failures are described in the
/// returned string so the model can react to them. `execute` takes `&mut self`
/// because calls mutate a shared document; calls within one batch run one
/// after another and must not be made concurrent, since later calls can
/// depend on edits made by earlier ones.
#[async_trait]
pub trait ToolExecutor: Send {
    async fn execute(&mut self, call: &ToolCall) -> String;
}
