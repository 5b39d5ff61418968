// ABOUTME: ReadDocumentTool - returns the document, or a line range of it,
// ABOUTME: with line numbers. Output is capped to bound token usage.

use serde_json::{Map, Value};

use super::args::{count_words, int_arg};
use crate::document::{Document, DocumentContext};
use crate::tool::{DocumentTool, ToolOutput};

/// Maximum characters of output before truncation.
pub const READ_LIMIT: usize = 8000;

/// Tool for reading the document with line numbers.
pub struct ReadDocumentTool;

impl DocumentTool for ReadDocumentTool {
    fn name(&self) -> &str {
        "read_document"
    }

    fn description(&self) -> &str {
        "Read the current document. Returns the text with 1-based line numbers. \
         Optionally pass start_line and end_line (inclusive) to read only part of a long document."
    }

    fn schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "start_line": {
                    "type": "integer",
                    "description": "First line to return (1-based, inclusive). Defaults to 1."
                },
                "end_line": {
                    "type": "integer",
                    "description": "Last line to return (1-based, inclusive). Defaults to the last line."
                }
            },
            "required": []
        })
    }

    fn execute(
        &self,
        args: &Map<String, Value>,
        document: &mut dyn Document,
        _context: &DocumentContext,
    ) -> ToolOutput {
        let text = document.text_content();
        let lines: Vec<&str> = text.split('\n').collect();
        let total = lines.len();
        let last = total as i64;

        let start = int_arg(args, "start_line").unwrap_or(1).clamp(1, last) as usize;
        let end = int_arg(args, "end_line").unwrap_or(last).clamp(1, last) as usize;

        if start > end {
            return ToolOutput::error(format!(
                "Invalid line range: start_line {} is after end_line {} (the document has {} lines)",
                start, end, total
            ));
        }

        let mut output = format!(
            "Document: {} lines, {} words\nShowing lines {}-{}:\n\n",
            total,
            count_words(&text),
            start,
            end
        );
        let body = lines[start - 1..end]
            .iter()
            .enumerate()
            .map(|(i, line)| format!("{}: {}", start + i, line))
            .collect::<Vec<_>>()
            .join("\n");
        output.push_str(&body);

        if output.chars().count() > READ_LIMIT {
            let mut truncated: String = output.chars().take(READ_LIMIT).collect();
            truncated.push_str(&format!(
                "\n\n[Output truncated at {} characters. Use start_line and end_line to read the rest.]",
                READ_LIMIT
            ));
            return ToolOutput::text(truncated).with_detail("truncated", true);
        }

        ToolOutput::text(output)
    }
}
