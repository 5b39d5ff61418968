// ABOUTME: Defines ToolOutput - what a document tool hands back to the executor:
// ABOUTME: the text the model sees plus details about what the tool touched.

use serde::Serialize;
use serde_json::{Map, Value};

/// Outcome of running a document tool.
///
/// Errors are still plain text for the model; `is_error` only marks them for
/// the executor's logging.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    /// Text returned to the model.
    pub content: String,

    /// Whether this output describes bad input or a failed lookup.
    pub is_error: bool,

    /// Facts about the run (edited range, match count, truncation) for logs.
    pub details: Map<String, Value>,
}

impl ToolOutput {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: message.into(),
            is_error: true,
            ..Self::default()
        }
    }

    /// Record a detail. Values that fail to serialize are skipped.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.details.insert(key.into(), v);
        }
        self
    }

    /// Details as `key=value` pairs in key order, for a single log field.
    pub fn details_summary(&self) -> String {
        self.details
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
