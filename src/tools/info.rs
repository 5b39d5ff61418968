// ABOUTME: GetDocumentInfoTool - reports file name, size counts, and the
// ABOUTME: current selection as a JSON object.

use serde_json::{Map, Value};

use super::args::{count_words, preview};
use crate::document::{Document, DocumentContext};
use crate::tool::{DocumentTool, ToolOutput};

const SELECTION_PREVIEW_CHARS: usize = 500;

/// Tool for document metadata.
///
/// Counts describe the markdown source from the [`DocumentContext`]; the
/// selection comes from the live document.
pub struct GetDocumentInfoTool;

impl DocumentTool for GetDocumentInfoTool {
    fn name(&self) -> &str {
        "get_document_info"
    }

    fn description(&self) -> &str {
        "Get information about the open document: file name, line, word and character counts, \
         and the text the user currently has selected, if any."
    }

    fn schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    fn execute(
        &self,
        _args: &Map<String, Value>,
        document: &mut dyn Document,
        context: &DocumentContext,
    ) -> ToolOutput {
        let content = &context.content;
        let selection = document.selection();

        let mut info = serde_json::json!({
            "fileName": context.display_name(),
            "lineCount": content.split('\n').count(),
            "wordCount": count_words(content),
            "charCount": content.chars().count(),
            "hasSelection": !selection.is_empty(),
        });
        if !selection.is_empty() {
            let selected = document.text_between(selection.from, selection.to);
            info["selectedText"] = Value::String(preview(&selected, SELECTION_PREVIEW_CHARS));
        }

        match serde_json::to_string_pretty(&info) {
            Ok(json) => ToolOutput::text(json),
            Err(e) => ToolOutput::error(format!("Failed to encode document info: {}", e)),
        }
    }
}
