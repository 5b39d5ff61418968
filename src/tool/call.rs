// ABOUTME: ToolCall and ToolResult - one model-requested invocation and the
// ABOUTME: text it produced, correlated by the vendor-supplied call id.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Opaque id used to correlate the call with its result.
    pub id: String,

    /// Name of the requested tool.
    pub name: String,

    /// Parsed arguments.
    pub arguments: Map<String, Value>,

    /// Set when the vendor's argument payload could not be parsed into an
    /// object. The executor reports it back to the model instead of running.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments_error: Option<String>,
}

impl ToolCall {
    /// Create a call from arguments the vendor sent as a native JSON value.
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        let (arguments, arguments_error) = match arguments {
            Value::Object(map) => (map, None),
            Value::Null => (Map::new(), None),
            other => (
                Map::new(),
                Some(format!("expected a JSON object, got {}", other)),
            ),
        };
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
            arguments_error,
        }
    }

    /// Create a call from arguments the vendor sent as a JSON-encoded string.
    pub fn from_json_str(id: impl Into<String>, name: impl Into<String>, raw: &str) -> Self {
        if raw.trim().is_empty() {
            return Self::new(id, name, Value::Null);
        }
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => Self::new(id, name, value),
            Err(e) => Self {
                id: id.into(),
                name: name.into(),
                arguments: Map::new(),
                arguments_error: Some(format!("malformed JSON arguments ({})", e)),
            },
        }
    }
}

/// The text produced by executing one [`ToolCall`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub tool_call_id: String,

    /// Name of the tool that ran. Some vendors correlate results by name.
    pub name: String,

    pub content: String,
}

impl ToolResult {
    /// Create a result answering `call`.
    pub fn for_call(call: &ToolCall, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: call.id.clone(),
            name: call.name.clone(),
            content: content.into(),
        }
    }
}
