// ABOUTME: DocumentToolExecutor - dispatches tool calls by name against one
// ABOUTME: live document, turning every outcome into text for the model.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::document::{Document, DocumentContext};
use crate::tool::{Registry, ToolCall, ToolExecutor};

/// Executes document tool calls against a borrowed live document.
pub struct DocumentToolExecutor<'a> {
    document: &'a mut dyn Document,
    context: DocumentContext,
    registry: Registry,
}

/// Create an executor for the standard document tools.
pub fn create_tool_executor(
    document: &mut dyn Document,
    context: DocumentContext,
) -> DocumentToolExecutor<'_> {
    DocumentToolExecutor {
        document,
        context,
        registry: Registry::document_tools(),
    }
}

impl<'a> DocumentToolExecutor<'a> {
    /// Use a different tool registry.
    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    pub fn context(&self) -> &DocumentContext {
        &self.context
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

#[async_trait]
impl<'a> ToolExecutor for DocumentToolExecutor<'a> {
    async fn execute(&mut self, call: &ToolCall) -> String {
        let Some(tool) = self.registry.get(&call.name) else {
            warn!(tool = %call.name, id = %call.id, "model requested an unknown tool");
            return format!("Unknown tool: {}", call.name);
        };

        if let Some(error) = &call.arguments_error {
            warn!(tool = %call.name, id = %call.id, %error, "unusable tool arguments");
            return format!("Invalid arguments for {}: {}", call.name, error);
        }

        debug!(tool = %call.name, id = %call.id, "executing tool");
        let output = tool.execute(&call.arguments, &mut *self.document, &self.context);
        if output.is_error {
            warn!(tool = %call.name, id = %call.id, content = %output.content, "tool input error");
        } else {
            debug!(
                tool = %call.name,
                id = %call.id,
                bytes = output.content.len(),
                details = %output.details_summary(),
                "tool finished"
            );
        }
        output.content
    }
}
