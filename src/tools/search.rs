// ABOUTME: SearchDocumentTool - finds lines matching a literal string or a
// ABOUTME: case-insensitive regex, with one line of context on each side.

use regex::{Regex, RegexBuilder};
use serde_json::{Map, Value};

use super::args::{bool_arg, str_arg};
use crate::document::{Document, DocumentContext};
use crate::tool::{DocumentTool, ToolOutput};

/// Maximum number of matching lines reported.
pub const MAX_MATCHES: usize = 20;

/// Tool for searching the document line by line.
pub struct SearchDocumentTool;

enum Matcher<'a> {
    Literal(&'a str),
    Pattern(Regex),
}

impl Matcher<'_> {
    fn is_match(&self, line: &str) -> bool {
        match self {
            Matcher::Literal(query) => line.contains(query),
            Matcher::Pattern(re) => re.is_match(line),
        }
    }
}

impl DocumentTool for SearchDocumentTool {
    fn name(&self) -> &str {
        "search_document"
    }

    fn description(&self) -> &str {
        "Search the document for text. Returns matching lines with their line numbers and one line \
         of context before and after. Plain queries are case-sensitive; set is_regex to use a \
         case-insensitive regular expression. At most 20 matches are returned."
    }

    fn schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The text or regular expression to search for"
                },
                "is_regex": {
                    "type": "boolean",
                    "description": "Treat query as a case-insensitive regular expression. Default false.",
                    "default": false
                }
            },
            "required": ["query"]
        })
    }

    fn execute(
        &self,
        args: &Map<String, Value>,
        document: &mut dyn Document,
        _context: &DocumentContext,
    ) -> ToolOutput {
        let query = match str_arg(args, "query") {
            Some(q) if !q.is_empty() => q,
            _ => return ToolOutput::error("Error: 'query' parameter is required and must not be empty"),
        };

        let matcher = if bool_arg(args, "is_regex") {
            match RegexBuilder::new(query).case_insensitive(true).build() {
                Ok(re) => Matcher::Pattern(re),
                Err(e) => return ToolOutput::error(format!("Invalid regex: {}", e)),
            }
        } else {
            Matcher::Literal(query)
        };

        let text = document.text_content();
        let lines: Vec<&str> = text.split('\n').collect();
        let matches: Vec<usize> = lines
            .iter()
            .enumerate()
            .filter(|(_, line)| matcher.is_match(line))
            .map(|(i, _)| i)
            .take(MAX_MATCHES)
            .collect();

        if matches.is_empty() {
            return ToolOutput::text(format!("No matches found for \"{}\"", query))
                .with_detail("matches", 0);
        }

        let sections: Vec<String> = matches
            .iter()
            .map(|&i| {
                let mut section = Vec::with_capacity(3);
                if i > 0 {
                    section.push(format!("  {}: {}", i, lines[i - 1]));
                }
                section.push(format!("> {}: {}", i + 1, lines[i]));
                if let Some(after) = lines.get(i + 1) {
                    section.push(format!("  {}: {}", i + 2, after));
                }
                section.join("\n")
            })
            .collect();

        let limit_note = if matches.len() == MAX_MATCHES {
            format!(" (showing the first {})", MAX_MATCHES)
        } else {
            String::new()
        };

        ToolOutput::text(format!(
            "Found {} matching line(s) for \"{}\"{}:\n\n{}",
            matches.len(),
            query,
            limit_note,
            sections.join("\n---\n")
        ))
        .with_detail("matches", matches.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::RichDocument;
    use serde_json::json;

    fn search(doc: &mut RichDocument, args: Value) -> ToolOutput {
        let args = args.as_object().cloned().unwrap_or_default();
        SearchDocumentTool.execute(&args, doc, &DocumentContext::default())
    }

    #[test]
    fn test_search_finds_matches_with_context() {
        let mut doc = RichDocument::from_text("intro\nHello, world!\nmiddle\nHello again!\noutro");
        let output = search(&mut doc, json!({"query": "Hello"}));

        assert!(!output.is_error);
        assert!(output.content.contains("Found 2 matching line(s)"));
        assert!(output.content.contains("  1: intro\n> 2: Hello, world!\n  3: middle"));
        assert!(output.content.contains("> 4: Hello again!\n  5: outro"));
        assert_eq!(output.details["matches"], 2);
    }

    #[test]
    fn test_search_first_and_last_line_have_one_sided_context() {
        let mut doc = RichDocument::from_text("target\nx\ntarget");
        let output = search(&mut doc, json!({"query": "target"}));

        assert!(output.content.contains("> 1: target\n  2: x\n---\n  2: x\n> 3: target"));
    }

    #[test]
    fn test_search_literal_is_case_sensitive() {
        let mut doc = RichDocument::from_text("Hello\nhello");
        let output = search(&mut doc, json!({"query": "hello"}));
        assert!(output.content.contains("Found 1 matching line(s)"));
        assert!(output.content.contains("> 2: hello"));
    }

    #[test]
    fn test_search_regex_is_case_insensitive() {
        let mut doc = RichDocument::from_text("Hello\nhello\nHELP");
        let output = search(&mut doc, json!({"query": "^hel+o$", "is_regex": true}));
        assert!(output.content.contains("Found 2 matching line(s)"));
    }

    #[test]
    fn test_search_no_matches() {
        let mut doc = RichDocument::from_text("Hello, world!");
        let output = search(&mut doc, json!({"query": "foobar"}));

        assert!(!output.is_error);
        assert!(output.content.contains("No matches found"));
    }

    #[test]
    fn test_search_invalid_regex() {
        let mut doc = RichDocument::from_text("anything");
        let output = search(&mut doc, json!({"query": "[invalid", "is_regex": true}));

        assert!(output.is_error);
        assert!(output.content.contains("Invalid regex"));
    }

    #[test]
    fn test_search_caps_matches() {
        let text = (1..=30).map(|i| format!("item {}", i)).collect::<Vec<_>>().join("\n");
        let mut doc = RichDocument::from_text(&text);
        let output = search(&mut doc, json!({"query": "item"}));

        assert_eq!(output.details["matches"], MAX_MATCHES);
        assert_eq!(output.content.matches("\n> ").count(), MAX_MATCHES);
        assert!(output.content.contains("> 20: item 20"));
        assert!(!output.content.contains("> 21: item 21"));
        assert!(output.content.contains("showing the first 20"));
    }

    #[test]
    fn test_search_requires_query() {
        let mut doc = RichDocument::from_text("text");
        let output = search(&mut doc, json!({"query": ""}));
        assert!(output.is_error);
        assert!(output.content.contains("'query' parameter is required"));
    }
}
