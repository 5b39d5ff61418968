// ABOUTME: Implements the Registry - the ordered, read-only catalog of
// ABOUTME: document tools and their definitions for the LLM.

use std::sync::Arc;

use super::DocumentTool;
use crate::llm::ToolDefinition;
use crate::tools::{EditDocumentTool, GetDocumentInfoTool, ReadDocumentTool, SearchDocumentTool};

/// An ordered set of tools. Order is preserved when advertising to the model.
#[derive(Clone, Default)]
pub struct Registry {
    tools: Vec<Arc<dyn DocumentTool>>,
}

impl Registry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard catalog: read, search, edit, get-info.
    pub fn document_tools() -> Self {
        Self::new()
            .with(ReadDocumentTool)
            .with(SearchDocumentTool)
            .with(EditDocumentTool)
            .with(GetDocumentInfoTool)
    }

    /// Add a tool, replacing any existing tool with the same name in place.
    pub fn with<T: DocumentTool + 'static>(mut self, tool: T) -> Self {
        let tool: Arc<dyn DocumentTool> = Arc::new(tool);
        match self.tools.iter().position(|t| t.name() == tool.name()) {
            Some(index) => self.tools[index] = tool,
            None => self.tools.push(tool),
        }
        self
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn DocumentTool> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .map(|t| t.as_ref())
    }

    /// Tool names in registration order.
    pub fn list(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Get the number of registered tools.
    pub fn count(&self) -> usize {
        self.tools.len()
    }

    /// Convert all tools to LLM tool definitions, in order.
    pub fn to_definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description().to_string(),
                input_schema: t.schema(),
            })
            .collect()
    }
}

/// Definitions of the standard document tools.
pub fn tool_definitions() -> Vec<ToolDefinition> {
    Registry::document_tools().to_definitions()
}
