// ABOUTME: EditDocumentTool - replaces the first exact occurrence of a string.
// ABOUTME: Maps flat-text offsets to document positions and edits atomically.

use serde_json::{Map, Value};

use super::args::{preview, str_arg};
use crate::document::{Document, DocumentContext, char_offset, text_offset_to_position};
use crate::tool::{DocumentTool, ToolOutput};

const PREVIEW_CHARS: usize = 60;

/// Tool for precise text replacement in the document.
///
/// Only the first occurrence is replaced. The match is located in the
/// flattened text, then both ends are mapped to structural positions so the
/// surrounding formatting and block structure survive the edit.
pub struct EditDocumentTool;

impl DocumentTool for EditDocumentTool {
    fn name(&self) -> &str {
        "edit_document"
    }

    fn description(&self) -> &str {
        "Edit the document by replacing the first exact occurrence of `find` with `replace`. \
         `find` must match the document text exactly, including whitespace; use search_document \
         or read_document first to get it right. Use an empty `replace` to delete text."
    }

    fn schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "find": {
                    "type": "string",
                    "description": "The exact text to find (first occurrence is replaced)"
                },
                "replace": {
                    "type": "string",
                    "description": "The text to put in its place (may be empty)"
                }
            },
            "required": ["find", "replace"]
        })
    }

    fn execute(
        &self,
        args: &Map<String, Value>,
        document: &mut dyn Document,
        _context: &DocumentContext,
    ) -> ToolOutput {
        let find = match str_arg(args, "find") {
            Some(f) if !f.is_empty() => f,
            _ => return ToolOutput::error("Error: 'find' parameter is required and must not be empty"),
        };
        let Some(replace) = str_arg(args, "replace") else {
            return ToolOutput::error(
                "Error: 'replace' parameter is required (use an empty string to delete text)",
            );
        };

        let text = document.text_content();
        let Some(byte_index) = text.find(find) else {
            return ToolOutput::error(format!(
                "Text not found: \"{}\". Use search_document to locate the exact text before editing.",
                preview(find, PREVIEW_CHARS)
            ));
        };

        let start = char_offset(&text, byte_index);
        let end = start + find.chars().count();
        let from = text_offset_to_position(&*document, start);
        let to = text_offset_to_position(&*document, end);

        if let Err(e) = document.replace_range(from, to, replace) {
            return ToolOutput::error(format!("Edit failed: {}", e));
        }

        let line = text[..byte_index].matches('\n').count() + 1;
        ToolOutput::text(format!(
            "Edited line ~{}: replaced \"{}\" with \"{}\"",
            line,
            preview(find, PREVIEW_CHARS),
            preview(replace, PREVIEW_CHARS)
        ))
        .with_detail("line", line)
        .with_detail("from", from)
        .with_detail("to", to)
    }
}
