// ABOUTME: Tests for Anthropic client type conversions.
// ABOUTME: Verifies serialization and tool-use parsing match the Messages API.

use serde_json::json;

use super::*;
use crate::tool::ToolResult;

#[test]
fn test_request_serialization() {
    let req = Request::new("claude-sonnet-4-20250514")
        .message(Message::user("Hello"))
        .system("You are helpful")
        .max_tokens(1024);

    let anthropic_req = AnthropicRequest::from(&req);

    assert_eq!(anthropic_req.model, "claude-sonnet-4-20250514");
    assert_eq!(anthropic_req.max_tokens, 1024);
    assert_eq!(anthropic_req.system, Some("You are helpful".to_string()));
    assert_eq!(anthropic_req.messages.len(), 1);
    assert_eq!(anthropic_req.messages[0]["role"], "user");
}

#[test]
fn test_request_defaults_max_tokens() {
    let req = Request::new("claude-sonnet-4-20250514").message(Message::user("Hello"));
    let json = serde_json::to_value(AnthropicRequest::from(&req)).unwrap();

    assert_eq!(json["max_tokens"], 4096);
    assert_eq!(json["messages"][0]["content"], "Hello");
    assert!(json.get("system").is_none());
    assert!(json.get("tools").is_none());
}

#[test]
fn test_tool_serialization() {
    let tool = ToolDefinition {
        name: "search_document".to_string(),
        description: "Search".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {"query": {"type": "string"}},
            "required": ["query"]
        }),
    };

    let json = serde_json::to_value(AnthropicTool::from(&tool)).unwrap();
    assert_eq!(json["name"], "search_document");
    assert_eq!(json["input_schema"]["required"][0], "query");
}

#[test]
fn test_parse_tool_use_response() {
    let resp: AnthropicResponse = serde_json::from_value(json!({
        "id": "msg_1",
        "type": "message",
        "role": "assistant",
        "content": [
            {"type": "text", "text": "Let me look."},
            {"type": "tool_use", "id": "toolu_1", "name": "read_document", "input": {"start_line": 2}}
        ],
        "stop_reason": "tool_use"
    }))
    .unwrap();

    let parsed = parse_anthropic_tool_response(resp);

    assert_eq!(parsed.text.as_deref(), Some("Let me look."));
    assert_eq!(parsed.tool_calls.len(), 1);
    assert_eq!(parsed.tool_calls[0].id, "toolu_1");
    assert_eq!(parsed.tool_calls[0].arguments["start_line"], 2);
    assert_eq!(parsed.raw_assistant_message["role"], "assistant");
    assert_eq!(parsed.raw_assistant_message["content"][1]["id"], "toolu_1");
}

#[test]
fn test_parse_keeps_unknown_blocks_raw() {
    let resp: AnthropicResponse = serde_json::from_value(json!({
        "content": [
            {"type": "thinking", "thinking": "hmm", "signature": "sig"},
            {"type": "text", "text": "Done."}
        ],
        "stop_reason": "end_turn"
    }))
    .unwrap();

    let parsed = parse_anthropic_tool_response(resp);

    assert_eq!(parsed.text.as_deref(), Some("Done."));
    assert!(!parsed.has_tool_calls());
    assert_eq!(parsed.raw_assistant_message["content"][0]["signature"], "sig");
}

#[test]
fn test_format_tool_results_single_user_turn() {
    let client = AnthropicClient::new("test-key");
    let results = vec![
        ToolResult {
            tool_call_id: "toolu_1".to_string(),
            name: "read_document".to_string(),
            content: "1: hi".to_string(),
        },
        ToolResult {
            tool_call_id: "toolu_2".to_string(),
            name: "search_document".to_string(),
            content: "No matches found for \"x\"".to_string(),
        },
    ];

    let ToolResultTurns::One(turn) = client.format_tool_results(&results) else {
        panic!("expected a single aggregated turn");
    };
    assert_eq!(turn["role"], "user");
    assert_eq!(turn["content"].as_array().unwrap().len(), 2);
    assert_eq!(
        turn["content"][0],
        json!({"type": "tool_result", "tool_use_id": "toolu_1", "content": "1: hi"})
    );
}

#[test]
fn test_client_name_and_capability() {
    let client = AnthropicClient::new("test-key");
    assert_eq!(client.name(), "anthropic");
    assert!(client.as_tool_calling().is_some());
}
