// ABOUTME: Human-friendly progress labels for tool calls, shown while the
// ABOUTME: agent works through a batch.

/// Label for a tool call; unknown tools fall back to their raw name.
pub fn status_label(tool_name: &str) -> &str {
    match tool_name {
        "read_document" => "Reading document...",
        "search_document" => "Searching document...",
        "edit_document" => "Editing document...",
        "get_document_info" => "Getting document info...",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_tools() {
        assert_eq!(status_label("read_document"), "Reading document...");
        assert_eq!(status_label("search_document"), "Searching document...");
        assert_eq!(status_label("edit_document"), "Editing document...");
        assert_eq!(status_label("get_document_info"), "Getting document info...");
    }

    #[test]
    fn test_unknown_tool_uses_raw_name() {
        assert_eq!(status_label("summarize"), "summarize");
    }
}
